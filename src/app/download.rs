//! Browser file downloads for generated reports.

use crate::http::ApiResponse;

/// Hand a downloaded body to the browser as a file.
///
/// Outside the browser this only logs; there is no file system to write to.
pub fn save_file(file_name: &str, fallback_type: &str, response: &ApiResponse) -> Result<(), String> {
    let content_type = response
        .content_type
        .as_deref()
        .filter(|ct| !ct.is_empty())
        .unwrap_or(fallback_type);

    #[cfg(target_arch = "wasm32")]
    {
        use wasm_bindgen::JsCast;

        let js_err = |e: wasm_bindgen::JsValue| format!("{e:?}");
        let window = web_sys::window().ok_or("no window")?;
        let document = window.document().ok_or("no document")?;

        let parts = js_sys::Array::new();
        parts.push(&js_sys::Uint8Array::from(response.body.as_slice()));
        let options = web_sys::BlobPropertyBag::new();
        options.set_type(content_type);
        let blob = web_sys::Blob::new_with_u8_array_sequence_and_options(&parts, &options)
            .map_err(js_err)?;
        let url = web_sys::Url::create_object_url_with_blob(&blob).map_err(js_err)?;

        let anchor: web_sys::HtmlAnchorElement = document
            .create_element("a")
            .map_err(js_err)?
            .dyn_into()
            .map_err(|_| "not an anchor".to_string())?;
        anchor.set_href(&url);
        anchor.set_download(file_name);
        anchor.click();
        let _ = web_sys::Url::revoke_object_url(&url);
    }

    tracing::info!(
        file_name,
        content_type,
        bytes = response.body.len(),
        "Report download ready"
    );
    Ok(())
}
