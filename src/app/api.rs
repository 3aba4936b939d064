//! Typed REST endpoints used by the pages.
//!
//! Thin wrappers over [`ApiClient`]; every path the dashboard calls lives here.

use odonto_model::{
    Caso, CasoStatus, Condicao, HistoricoEntry, Laudo, MarcacaoAnatomica, NovaMarcacao,
    NovaVitima, NovoCaso, NovoLaudo, NovoUsuario, Odontograma, PredictionRequest,
    PredictionResponse, Usuario, ValidationError, Vitima,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::http::{ApiClient, ApiError, ApiResponse};
use crate::session::{Session, SessionUser};

#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: SessionUser,
}

impl From<LoginResponse> for Session {
    fn from(resp: LoginResponse) -> Self {
        Session {
            token: resp.token,
            user: resp.user,
        }
    }
}

/// Generated case report
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Relatorio {
    #[serde(rename = "_id")]
    pub id: String,
    pub titulo: String,
    pub conteudo: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Pdf,
    Texto,
}

impl ReportFormat {
    fn path_segment(&self) -> &'static str {
        match self {
            Self::Pdf => "pdf",
            Self::Texto => "texto",
        }
    }

    pub fn file_name(&self, caso_id: &str) -> String {
        match self {
            Self::Pdf => format!("relatorio-{caso_id}.pdf"),
            Self::Texto => format!("relatorio-{caso_id}.txt"),
        }
    }

    pub fn fallback_content_type(&self) -> &'static str {
        match self {
            Self::Pdf => "application/pdf",
            Self::Texto => "text/plain;charset=utf-8",
        }
    }
}

/// Collections arrive either bare or wrapped (`{ "casos": [...] }`).
fn list_from_value<T: DeserializeOwned>(value: serde_json::Value) -> Result<Vec<T>, ApiError> {
    let array = match value {
        serde_json::Value::Array(_) => value,
        serde_json::Value::Null => return Ok(Vec::new()),
        serde_json::Value::Object(map) => map
            .into_iter()
            .map(|(_, v)| v)
            .find(serde_json::Value::is_array)
            .ok_or_else(|| ApiError::Decode("expected a list".to_string()))?,
        _ => return Err(ApiError::Decode("expected a list".to_string())),
    };
    serde_json::from_value(array).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Single records may also come wrapped (`{ "caso": {...}, "message": ... }`).
fn record_from_value<T: DeserializeOwned>(value: serde_json::Value) -> Option<T> {
    if let Ok(record) = serde_json::from_value::<T>(value.clone()) {
        return Some(record);
    }
    match value {
        serde_json::Value::Object(map) => map
            .into_iter()
            .filter(|(_, v)| v.is_object())
            .find_map(|(_, v)| serde_json::from_value(v).ok()),
        _ => None,
    }
}

/// Like [`record_from_value`], but a body that matches nothing is a decode error.
fn require_record<T: DeserializeOwned>(value: serde_json::Value) -> Result<T, ApiError> {
    let direct = match serde_json::from_value::<T>(value.clone()) {
        Ok(record) => return Ok(record),
        Err(e) => e.to_string(),
    };
    record_from_value(value).ok_or(ApiError::Decode(direct))
}

/// Why issuing a laudo stopped
#[derive(Debug, Clone, Error, PartialEq)]
pub enum IssueError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("A vítima não possui odontograma salvo.")]
    NoChart,

    #[error(transparent)]
    Api(#[from] ApiError),

    /// The laudo exists but the case is still open on the server
    #[error("Laudo emitido, mas o caso não pôde ser finalizado: {0}")]
    NotFinalized(ApiError),
}

/// Update payload that closes a case after its final report
pub fn finalized(update: &NovoCaso) -> NovoCaso {
    NovoCaso {
        status: CasoStatus::Finalizado,
        ..update.clone()
    }
}

/// Missing related data is an empty result, not an error.
fn empty_on_not_found<T>(result: Result<Vec<T>, ApiError>) -> Result<Vec<T>, ApiError> {
    match result {
        Err(e) if e.is_not_found() => Ok(Vec::new()),
        other => other,
    }
}

#[derive(Clone, PartialEq)]
pub struct Backend {
    client: ApiClient,
}

impl Backend {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    async fn list<T: DeserializeOwned>(&self, path: &str) -> Result<Vec<T>, ApiError> {
        list_from_value(self.client.get_json(path).await?)
    }

    // ---- session -----------------------------------------------------------

    /// Authenticate and persist the session
    pub async fn login(&self, email: &str, password: &str) -> Result<Session, ApiError> {
        let req = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let resp: LoginResponse = self.client.post_json("/login", &req).await?;
        let session = Session::from(resp);
        self.client.session().save(&session);
        Ok(session)
    }

    pub fn logout(&self) {
        self.client.session().clear();
    }

    /// Round-trip to the protected ping endpoint
    pub async fn protegido(&self) -> Result<serde_json::Value, ApiError> {
        self.client.get_json("/protegido").await
    }

    // ---- casos -------------------------------------------------------------

    pub async fn list_casos(&self) -> Result<Vec<Caso>, ApiError> {
        self.list("/api/casos").await
    }

    pub async fn get_caso(&self, id: &str) -> Result<Caso, ApiError> {
        let value = self
            .client
            .get_json(&format!("/api/casos/{}", urlencoding::encode(id)))
            .await?;
        record_from_value(value).ok_or_else(|| ApiError::Decode("caso".to_string()))
    }

    pub async fn create_caso(&self, caso: &NovoCaso) -> Result<Option<Caso>, ApiError> {
        let value = self.client.post_json("/api/casos", caso).await?;
        Ok(record_from_value(value))
    }

    /// Returns the updated case when the API echoes it back
    pub async fn update_caso(&self, id: &str, caso: &NovoCaso) -> Result<Option<Caso>, ApiError> {
        let value = self
            .client
            .put_json(&format!("/api/casos/{}", urlencoding::encode(id)), caso)
            .await?;
        Ok(record_from_value(value))
    }

    pub async fn delete_caso(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/api/casos/{}", urlencoding::encode(id)))
            .await
    }

    // ---- vitimas -----------------------------------------------------------

    pub async fn list_vitimas(&self, caso_id: &str) -> Result<Vec<Vitima>, ApiError> {
        empty_on_not_found(
            self.list(&format!(
                "/api/vitimas/caso/{}",
                urlencoding::encode(caso_id)
            ))
            .await,
        )
    }

    pub async fn create_vitima(&self, vitima: &NovaVitima) -> Result<Option<Vitima>, ApiError> {
        let value = self.client.post_json("/api/vitimas", vitima).await?;
        Ok(record_from_value(value))
    }

    pub async fn delete_vitima(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/api/vitimas/{}", urlencoding::encode(id)))
            .await
    }

    // ---- odontograma -------------------------------------------------------

    /// `None` only when the API answers 404; an unreadable chart is an error
    pub async fn get_odontograma(&self, vitima_id: &str) -> Result<Option<Odontograma>, ApiError> {
        let path = format!("/api/vitimas/{}/odontograma", urlencoding::encode(vitima_id));
        match self.client.get_json::<serde_json::Value>(&path).await {
            Ok(value) => require_record(value).map(Some),
            Err(e) if e.is_not_found() => Ok(None),
            Err(e) => Err(e),
        }
    }

    pub async fn save_odontograma(
        &self,
        vitima_id: &str,
        odontograma: &Odontograma,
    ) -> Result<(), ApiError> {
        let path = format!("/api/vitimas/{}/odontograma", urlencoding::encode(vitima_id));
        self.client
            .put_json::<_, serde_json::Value>(&path, odontograma)
            .await
            .map(|_| ())
    }

    pub async fn add_condicao(
        &self,
        vitima_id: &str,
        numero: u8,
        condicao: &Condicao,
    ) -> Result<(), ApiError> {
        let path = format!(
            "/api/vitimas/{}/odontograma/dente/{}",
            urlencoding::encode(vitima_id),
            numero
        );
        self.client
            .post_json::<_, serde_json::Value>(&path, condicao)
            .await
            .map(|_| ())
    }

    // ---- marcações ---------------------------------------------------------

    pub async fn list_marcacoes(&self, vitima_id: &str) -> Result<Vec<MarcacaoAnatomica>, ApiError> {
        empty_on_not_found(
            self.list(&format!(
                "/api/marcacoes/vitima/{}",
                urlencoding::encode(vitima_id)
            ))
            .await,
        )
    }

    pub async fn create_marcacao(
        &self,
        marcacao: &NovaMarcacao,
    ) -> Result<Option<MarcacaoAnatomica>, ApiError> {
        let value = self.client.post_json("/api/marcacoes", marcacao).await?;
        Ok(record_from_value(value))
    }

    pub async fn delete_marcacao(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/api/marcacoes/{}", urlencoding::encode(id)))
            .await
    }

    // ---- usuários ----------------------------------------------------------

    pub async fn list_users(&self) -> Result<Vec<Usuario>, ApiError> {
        self.list("/api/users").await
    }

    pub async fn create_user(&self, user: &NovoUsuario) -> Result<(), ApiError> {
        self.client
            .post_json::<_, serde_json::Value>("/api/users", user)
            .await
            .map(|_| ())
    }

    pub async fn update_user(&self, id: &str, user: &NovoUsuario) -> Result<(), ApiError> {
        self.client
            .put_json::<_, serde_json::Value>(
                &format!("/api/users/{}", urlencoding::encode(id)),
                user,
            )
            .await
            .map(|_| ())
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ApiError> {
        self.client
            .delete(&format!("/api/users/{}", urlencoding::encode(id)))
            .await
    }

    // ---- histórico ---------------------------------------------------------

    pub async fn list_historico(&self) -> Result<Vec<HistoricoEntry>, ApiError> {
        self.list("/api/historico/todos").await
    }

    // ---- laudos e relatórios -----------------------------------------------

    pub async fn list_laudos(&self, caso_id: &str) -> Result<Vec<Laudo>, ApiError> {
        empty_on_not_found(
            self.list(&format!(
                "/api/laudos-odontologicos/caso/{}",
                urlencoding::encode(caso_id)
            ))
            .await,
        )
    }

    /// Large payload (carries the chart snapshot): upload timeout
    pub async fn create_laudo(&self, laudo: &NovoLaudo) -> Result<Option<Laudo>, ApiError> {
        let value = self
            .client
            .upload_json("/api/laudos-odontologicos", laudo)
            .await?;
        Ok(record_from_value(value))
    }

    /// Snapshot the victim's saved chart into a laudo, upload it, then close the case.
    ///
    /// Field checks run before any request. A failed upload leaves the case open.
    pub async fn issue_laudo(
        &self,
        caso: &NovoCaso,
        caso_id: &str,
        vitima_id: &str,
        parecer: &str,
        observacoes: &str,
    ) -> Result<Option<Laudo>, IssueError> {
        NovoLaudo::check_fields(caso_id, vitima_id, parecer)?;
        let chart = self
            .get_odontograma(vitima_id)
            .await?
            .ok_or(IssueError::NoChart)?;
        let laudo = NovoLaudo::new(caso_id, vitima_id, &chart, parecer, observacoes)?;
        let created = self.create_laudo(&laudo).await?;
        info!(caso = %caso_id, vitima = %vitima_id, "Report issued");

        if let Err(e) = self.update_caso(caso_id, &finalized(caso)).await {
            warn!(caso = %caso_id, "Closing case after report failed: {e}");
            return Err(IssueError::NotFinalized(e));
        }
        Ok(created)
    }

    pub async fn generate_relatorio(&self, caso_id: &str) -> Result<Relatorio, ApiError> {
        let value = self
            .client
            .post_json(
                &format!("/api/relatorios/{}", urlencoding::encode(caso_id)),
                &serde_json::json!({}),
            )
            .await?;
        Ok(record_from_value(value).unwrap_or_default())
    }

    pub async fn download_relatorio(
        &self,
        caso_id: &str,
        format: ReportFormat,
    ) -> Result<ApiResponse, ApiError> {
        self.client
            .get_bytes(&format!(
                "/api/relatorios/{}/{}",
                urlencoding::encode(caso_id),
                format.path_segment()
            ))
            .await
    }

    // ---- ML ----------------------------------------------------------------

    pub async fn predict(&self, req: &PredictionRequest) -> Result<PredictionResponse, ApiError> {
        self.client.ml_post_json("/api/ml/predict", req).await
    }

    pub async fn analyze(&self) -> Result<serde_json::Value, ApiError> {
        self.client.ml_get_json("/api/ml/analyze").await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::tests::{client_with, MockTransport};
    use crate::http::Method;
    use odonto_model::{reset_odontogram, Role, TipoOdontograma};
    use std::rc::Rc;

    fn backend(mock: &Rc<MockTransport>) -> Backend {
        Backend::new(client_with(mock.clone()).0)
    }

    #[tokio::test]
    async fn test_login_persists_session() {
        let mock = Rc::new(MockTransport::default());
        mock.reply(
            200,
            r#"{"token": "t.k.n", "user": {"_id": "u1", "name": "Ana", "email": "a@x.com", "role": "admin"}}"#,
        );
        let backend = backend(&mock);

        let session = backend.login(" a@x.com ", "secret").await.unwrap();
        assert_eq!(session.user.role, Role::Admin);
        assert_eq!(backend.client().session().load().unwrap(), Some(session));

        let body: serde_json::Value =
            serde_json::from_slice(mock.requests.borrow()[0].body.as_ref().unwrap()).unwrap();
        assert_eq!(body["email"], "a@x.com");
    }

    #[tokio::test]
    async fn test_wrapped_and_bare_lists() {
        let mock = Rc::new(MockTransport::default());
        mock.reply(200, r#"[{"_id":"u1","name":"A","email":"a@x.com","role":"perito"}]"#);
        mock.reply(200, r#"{"total": 1, "usuarios": [{"_id":"u2","name":"B","email":"b@x.com","role":"assistente"}]}"#);
        let backend = backend(&mock);

        assert_eq!(backend.list_users().await.unwrap()[0].id, "u1");
        assert_eq!(backend.list_users().await.unwrap()[0].id, "u2");
    }

    #[tokio::test]
    async fn test_victims_not_found_is_empty() {
        let mock = Rc::new(MockTransport::default());
        mock.reply(404, r#"{"message": "Nenhuma vítima"}"#);
        mock.reply(404, "");
        let backend = backend(&mock);

        assert!(backend.list_vitimas("c1").await.unwrap().is_empty());
        assert_eq!(backend.get_odontograma("v1").await.unwrap(), None);
        assert_eq!(
            mock.requests.borrow()[0].url,
            "http://localhost:3000/api/vitimas/caso/c1"
        );
    }

    #[tokio::test]
    async fn test_odontogram_paths() {
        let mock = Rc::new(MockTransport::default());
        mock.reply(200, "{}");
        mock.reply(200, "{}");
        let backend = backend(&mock);
        let chart = reset_odontogram(TipoOdontograma::Adulto);

        backend.save_odontograma("v 1", &chart).await.unwrap();
        backend
            .add_condicao(
                "v1",
                36,
                &odonto_model::Condicao {
                    tipo: odonto_model::TipoCondicao::Carie,
                    faces: Vec::new(),
                    descricao: String::new(),
                    data_registro: None,
                },
            )
            .await
            .unwrap();

        let requests = mock.requests.borrow();
        assert_eq!(requests[0].method, Method::Put);
        assert!(requests[0].url.ends_with("/api/vitimas/v%201/odontograma"));
        assert_eq!(requests[1].method, Method::Post);
        assert!(requests[1].url.ends_with("/api/vitimas/v1/odontograma/dente/36"));
    }

    #[tokio::test]
    async fn test_update_caso_unwraps_echoed_record() {
        let mock = Rc::new(MockTransport::default());
        mock.reply(
            200,
            r#"{"message": "ok", "caso": {"_id": "c1", "titulo": "T", "tipo": "Acidente",
                "data": "2024-01-01", "status": "arquivado", "localDoCaso": "X", "criadoPor": "u1"}}"#,
        );
        mock.reply(200, r#"{"message": "ok"}"#);
        let backend = backend(&mock);
        let caso: Caso = serde_json::from_str(
            r#"{"_id": "c1", "titulo": "T", "tipo": "Acidente", "data": "2024-01-01", "criadoPor": "u1"}"#,
        )
        .unwrap();

        let echoed = backend.update_caso("c1", &caso.to_update()).await.unwrap();
        assert_eq!(echoed.unwrap().status, odonto_model::CasoStatus::Arquivado);
        assert!(backend
            .update_caso("c1", &caso.to_update())
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_unreadable_chart_is_an_error() {
        let mock = Rc::new(MockTransport::default());
        mock.reply(
            200,
            r#"{"tipoOdontograma":"adulto","arcadaSuperior":[{"numero":18,"condicoes":[{"tipo":"desgaste"}]}],"arcadaInferior":[]}"#,
        );
        mock.reply(200, r#"{"message": "ok"}"#);
        let backend = backend(&mock);

        assert!(matches!(
            backend.get_odontograma("v1").await,
            Err(ApiError::Decode(_))
        ));
        assert!(matches!(
            backend.get_odontograma("v1").await,
            Err(ApiError::Decode(_))
        ));
    }

    #[tokio::test]
    async fn test_wrapped_chart_is_unwrapped() {
        let mock = Rc::new(MockTransport::default());
        let chart = reset_odontogram(TipoOdontograma::Infantil);
        mock.reply(
            200,
            &serde_json::json!({ "odontograma": chart }).to_string(),
        );
        let backend = backend(&mock);

        assert_eq!(backend.get_odontograma("v1").await.unwrap(), Some(chart));
    }

    fn open_case() -> NovoCaso {
        let caso: Caso = serde_json::from_str(
            r#"{"_id": "c1", "titulo": "T", "tipo": "Acidente", "data": "2024-01-01", "criadoPor": "u1"}"#,
        )
        .unwrap();
        caso.to_update()
    }

    fn reply_chart(mock: &MockTransport) {
        let chart = reset_odontogram(TipoOdontograma::Adulto);
        mock.reply(200, &serde_json::to_string(&chart).unwrap());
    }

    #[tokio::test]
    async fn test_issue_laudo_uploads_snapshot_then_finalizes() {
        let mock = Rc::new(MockTransport::default());
        reply_chart(&mock);
        mock.reply(201, r#"{"message": "criado"}"#);
        mock.reply(200, r#"{"message": "ok"}"#);
        let backend = backend(&mock);

        backend
            .issue_laudo(&open_case(), "c1", "v1", "Compatível", "")
            .await
            .unwrap();

        let requests = mock.requests.borrow();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].method, Method::Get);
        assert!(requests[0].url.ends_with("/api/vitimas/v1/odontograma"));

        assert_eq!(requests[1].method, Method::Post);
        assert!(requests[1].url.ends_with("/api/laudos-odontologicos"));
        assert_eq!(
            requests[1].timeout,
            backend.client().config().upload_timeout()
        );
        let laudo: serde_json::Value =
            serde_json::from_slice(requests[1].body.as_ref().unwrap()).unwrap();
        assert_eq!(laudo["odontogramaSnapshot"]["tipoOdontograma"], "adulto");
        assert_eq!(laudo["parecer"], "Compatível");

        assert_eq!(requests[2].method, Method::Put);
        assert!(requests[2].url.ends_with("/api/casos/c1"));
        let update: serde_json::Value =
            serde_json::from_slice(requests[2].body.as_ref().unwrap()).unwrap();
        assert_eq!(update["status"], "finalizado");
        assert_eq!(update["titulo"], "T");
    }

    #[tokio::test]
    async fn test_issue_laudo_checks_fields_before_any_request() {
        let mock = Rc::new(MockTransport::default());
        let backend = backend(&mock);

        assert_eq!(
            backend.issue_laudo(&open_case(), "c1", "", "Parecer", "").await,
            Err(IssueError::Invalid(ValidationError::Required("vitima")))
        );
        assert_eq!(
            backend.issue_laudo(&open_case(), "c1", "v1", "  ", "").await,
            Err(IssueError::Invalid(ValidationError::Required("parecer")))
        );
        assert!(mock.requests.borrow().is_empty());
    }

    #[tokio::test]
    async fn test_issue_laudo_without_chart() {
        let mock = Rc::new(MockTransport::default());
        mock.reply(404, r#"{"message": "Odontograma não encontrado"}"#);
        let backend = backend(&mock);

        assert_eq!(
            backend.issue_laudo(&open_case(), "c1", "v1", "Parecer", "").await,
            Err(IssueError::NoChart)
        );
        assert_eq!(mock.requests.borrow().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_upload_leaves_case_open() {
        let mock = Rc::new(MockTransport::default());
        reply_chart(&mock);
        mock.reply(500, r#"{"message": "falha ao gravar"}"#);
        let backend = backend(&mock);

        let err = backend
            .issue_laudo(&open_case(), "c1", "v1", "Parecer", "")
            .await
            .unwrap_err();
        assert!(matches!(err, IssueError::Api(ApiError::Status { status: 500, .. })));

        let requests = mock.requests.borrow();
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().all(|r| r.method != Method::Put));
    }

    #[tokio::test]
    async fn test_upload_timeout_leaves_case_open() {
        let mock = Rc::new(MockTransport::default());
        reply_chart(&mock);
        mock.fail(ApiError::Timeout);
        let backend = backend(&mock);

        assert_eq!(
            backend.issue_laudo(&open_case(), "c1", "v1", "Parecer", "").await,
            Err(IssueError::Api(ApiError::Timeout))
        );
        assert_eq!(mock.requests.borrow().len(), 2);
    }

    #[tokio::test]
    async fn test_finalize_failure_is_reported() {
        let mock = Rc::new(MockTransport::default());
        reply_chart(&mock);
        mock.reply(201, "{}");
        mock.reply(409, r#"{"message": "caso bloqueado"}"#);
        let backend = backend(&mock);

        match backend
            .issue_laudo(&open_case(), "c1", "v1", "Parecer", "")
            .await
        {
            Err(IssueError::NotFinalized(ApiError::Status { status, message })) => {
                assert_eq!(status, 409);
                assert_eq!(message, "caso bloqueado");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_report_file_names() {
        assert_eq!(ReportFormat::Pdf.file_name("c1"), "relatorio-c1.pdf");
        assert_eq!(ReportFormat::Texto.path_segment(), "texto");
    }
}
