//! Page selector for collection views.

use dioxus::prelude::*;

/// Page numbers to show around `page`; `None` marks a gap.
pub fn page_window(page: usize, page_count: usize) -> Vec<Option<usize>> {
    if page_count <= 7 {
        return (1..=page_count).map(Some).collect();
    }
    let start = page.saturating_sub(1).max(2);
    let end = (page + 1).min(page_count - 1);
    let mut out = vec![Some(1)];
    if start > 2 {
        out.push(None);
    }
    out.extend((start..=end).map(Some));
    if end < page_count - 1 {
        out.push(None);
    }
    out.push(Some(page_count));
    out
}

#[component]
pub fn Pagination(page: usize, page_count: usize, on_change: EventHandler<usize>) -> Element {
    if page_count <= 1 {
        return rsx! {};
    }

    rsx! {
        nav { class: "flex items-center justify-center gap-1 mt-4", aria_label: "Paginação",
            button {
                class: "outline",
                r#type: "button",
                disabled: page <= 1,
                onclick: move |_| on_change.call(page.saturating_sub(1)),
                "‹"
            }
            for (i, slot) in page_window(page, page_count).into_iter().enumerate() {
                match slot {
                    Some(n) => rsx! {
                        button {
                            key: "{i}",
                            class: if n == page { "" } else { "outline" },
                            r#type: "button",
                            onclick: move |_| on_change.call(n),
                            "{n}"
                        }
                    },
                    None => rsx! { span { key: "{i}", "…" } },
                }
            }
            button {
                class: "outline",
                r#type: "button",
                disabled: page >= page_count,
                onclick: move |_| on_change.call(page + 1),
                "›"
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_window_small() {
        assert_eq!(page_window(2, 3), vec![Some(1), Some(2), Some(3)]);
        assert!(page_window(1, 0).is_empty());
    }

    #[test]
    fn test_page_window_gaps() {
        assert_eq!(
            page_window(5, 10),
            vec![Some(1), None, Some(4), Some(5), Some(6), None, Some(10)]
        );
        assert_eq!(
            page_window(1, 10),
            vec![Some(1), Some(2), None, Some(10)]
        );
        assert_eq!(
            page_window(10, 10),
            vec![Some(1), None, Some(9), Some(10)]
        );
    }
}
