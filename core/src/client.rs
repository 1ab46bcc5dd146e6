//! Stateless HTTP request builder and response parser for the cinema API.
//!
//! # Design
//! `CineClient` holds the base URL and the shared error hook, nothing else.
//! Each CRUD operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! Both are generic over [`Resource`], so the four collections share one
//! implementation and differ only in their path segment and DTOs.
//!
//! Every rejection the client produces is passed to the error hook before
//! it is returned. The default hook logs through `tracing`.

use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{Id, Page, Resource};

/// Callback invoked with every error before it is returned to the caller.
pub type ErrorHook = Arc<dyn Fn(&ApiError) + Send + Sync>;

fn log_error(err: &ApiError) {
    tracing::error!(error = %err, "API error");
}

/// Synchronous, stateless client for the cinema API.
#[derive(Clone)]
pub struct CineClient {
    base_url: String,
    on_error: ErrorHook,
}

impl fmt::Debug for CineClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CineClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl CineClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            on_error: Arc::new(log_error),
        }
    }

    pub fn from_config(config: &ClientConfig) -> Self {
        Self::new(&config.base_url)
    }

    /// Replace the error hook.
    pub fn with_error_hook(mut self, hook: ErrorHook) -> Self {
        self.on_error = hook;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Pass `err` through the error hook and hand it back.
    pub fn reject(&self, err: ApiError) -> ApiError {
        (self.on_error)(&err);
        err
    }

    fn collection_url<R: Resource>(&self) -> String {
        format!("{}/{}/", self.base_url, R::COLLECTION)
    }

    fn item_url<R: Resource>(&self, id: Id) -> String {
        format!("{}/{}/{id}/", self.base_url, R::COLLECTION)
    }

    fn request(&self, method: HttpMethod, path: String) -> HttpRequest {
        HttpRequest {
            method,
            path,
            headers: vec![("accept".to_string(), "application/json".to_string())],
            body: None,
        }
    }

    fn request_with_body<P: Serialize>(
        &self,
        method: HttpMethod,
        path: String,
        payload: &P,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(payload)
            .map_err(|e| self.reject(ApiError::SerializationError(e.to_string())))?;
        let mut req = self.request(method, path);
        req.headers
            .push(("content-type".to_string(), "application/json".to_string()));
        req.body = Some(body);
        Ok(req)
    }

    pub fn build_list<R: Resource>(&self) -> HttpRequest {
        self.request(HttpMethod::Get, self.collection_url::<R>())
    }

    pub fn build_get<R: Resource>(&self, id: Id) -> HttpRequest {
        self.request(HttpMethod::Get, self.item_url::<R>(id))
    }

    pub fn build_create<R: Resource>(&self, payload: &R::Payload) -> Result<HttpRequest, ApiError> {
        self.request_with_body(HttpMethod::Post, self.collection_url::<R>(), payload)
    }

    pub fn build_update<R: Resource>(
        &self,
        id: Id,
        payload: &R::Payload,
    ) -> Result<HttpRequest, ApiError> {
        self.request_with_body(HttpMethod::Put, self.item_url::<R>(id), payload)
    }

    pub fn build_delete<R: Resource>(&self, id: Id) -> HttpRequest {
        self.request(HttpMethod::Delete, self.item_url::<R>(id))
    }

    /// Parse a list response, accepting both the envelope and a bare array.
    pub fn parse_list<R: Resource>(&self, response: HttpResponse) -> Result<Vec<R>, ApiError> {
        let page: Page<R> = self.decode(response)?;
        Ok(page.into_items())
    }

    pub fn parse_get<R: Resource>(&self, response: HttpResponse) -> Result<R, ApiError> {
        self.decode(response)
    }

    pub fn parse_create<R: Resource>(&self, response: HttpResponse) -> Result<R, ApiError> {
        self.decode(response)
    }

    pub fn parse_update<R: Resource>(&self, response: HttpResponse) -> Result<R, ApiError> {
        self.decode(response)
    }

    pub fn parse_delete(&self, response: HttpResponse) -> Result<(), ApiError> {
        self.check_status(&response)
    }

    fn decode<T: DeserializeOwned>(&self, response: HttpResponse) -> Result<T, ApiError> {
        self.check_status(&response)?;
        serde_json::from_str(&response.body)
            .map_err(|e| self.reject(ApiError::DeserializationError(e.to_string())))
    }

    /// Map non-2xx status codes to the appropriate `ApiError` variant.
    fn check_status(&self, response: &HttpResponse) -> Result<(), ApiError> {
        if response.is_success() {
            return Ok(());
        }
        let err = if response.status == 404 {
            ApiError::NotFound
        } else {
            ApiError::HttpError {
                status: response.status,
                body: response.body.clone(),
            }
        };
        Err(self.reject(err))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
    use rust_decimal::Decimal;

    use super::*;
    use crate::types::{
        Movie, MoviePayload, Reservation, ReservationPayload, Showtime, ShowtimePayload, User,
        UserPayload,
    };

    fn client() -> CineClient {
        CineClient::new("http://localhost:8000/api")
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    fn header<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
        req.headers
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn build_list_uses_collection_path_with_trailing_slash() {
        let req = client().build_list::<User>();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.path, "http://localhost:8000/api/usuarios/");
        assert!(req.body.is_none());
        assert_eq!(header(&req, "accept"), Some("application/json"));
        assert_eq!(header(&req, "content-type"), None);
    }

    #[test]
    fn build_get_uses_item_path() {
        assert_eq!(
            client().build_get::<Movie>(7).path,
            "http://localhost:8000/api/peliculas/7/"
        );
        assert_eq!(
            client().build_get::<Showtime>(3).path,
            "http://localhost:8000/api/funciones/3/"
        );
    }

    #[test]
    fn build_create_serializes_payload_without_id() {
        let payload = UserPayload {
            nombre: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            fecha_registro: Utc.with_ymd_and_hms(2026, 10, 17, 12, 0, 0).unwrap(),
        };
        let req = client().build_create::<User>(&payload).unwrap();
        assert_eq!(req.method, HttpMethod::Post);
        assert_eq!(req.path, "http://localhost:8000/api/usuarios/");
        assert_eq!(header(&req, "content-type"), Some("application/json"));
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["nombre"], "Ana");
        assert_eq!(body["fecha_registro"], "2026-10-17T12:00:00Z");
        assert!(body.get("id").is_none());
    }

    #[test]
    fn build_update_puts_full_resource() {
        let payload = ShowtimePayload {
            pelicula: 2,
            sala: "Sala 1".to_string(),
            fecha: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
            hora_inicio: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
            precio: Decimal::new(12000, 0),
        };
        let req = client().build_update::<Showtime>(5, &payload).unwrap();
        assert_eq!(req.method, HttpMethod::Put);
        assert_eq!(req.path, "http://localhost:8000/api/funciones/5/");
        let body: serde_json::Value = serde_json::from_str(req.body.as_deref().unwrap()).unwrap();
        assert_eq!(body["hora_inicio"], "18:30:00");
        assert_eq!(body["fecha"], "2026-10-17");
        assert_eq!(body["precio"], "12000");
    }

    #[test]
    fn build_delete_has_no_body() {
        let req = client().build_delete::<Reservation>(9);
        assert_eq!(req.method, HttpMethod::Delete);
        assert_eq!(req.path, "http://localhost:8000/api/reservas/9/");
        assert!(req.body.is_none());
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let client = CineClient::new("http://localhost:8000/api/");
        assert_eq!(client.build_list::<Reservation>().path, "http://localhost:8000/api/reservas/");
    }

    #[test]
    fn parse_list_accepts_envelope_and_bare_array() {
        let c = client();
        let envelope = response(
            200,
            r#"{"count":1,"next":null,"previous":null,"results":[{"id":1,"titulo":"Dune"}]}"#,
        );
        let bare = response(200, r#"[{"id":1,"titulo":"Dune"}]"#);
        let from_envelope = c.parse_list::<Movie>(envelope).unwrap();
        let from_bare = c.parse_list::<Movie>(bare).unwrap();
        assert_eq!(from_envelope, from_bare);
        assert_eq!(from_bare[0].titulo, "Dune");
    }

    #[test]
    fn parse_create_accepts_any_2xx() {
        let body = r#"{"id":4,"usuario":1,"funcion":3,"cantidad_asientos":2,"fecha_reserva":"2026-10-17"}"#;
        let created = client().parse_create::<Reservation>(response(201, body)).unwrap();
        assert_eq!(created.id, 4);
        let ok = client().parse_create::<Reservation>(response(200, body)).unwrap();
        assert_eq!(ok, created);
    }

    #[test]
    fn parse_get_not_found() {
        let err = client().parse_get::<User>(response(404, "")).unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[test]
    fn parse_update_server_error_keeps_body() {
        let err = client()
            .parse_update::<Movie>(response(500, "internal error"))
            .unwrap_err();
        assert!(matches!(err, ApiError::HttpError { status: 500, ref body } if body == "internal error"));
    }

    #[test]
    fn parse_delete_accepts_no_content() {
        assert!(client().parse_delete(response(204, "")).is_ok());
        assert!(matches!(
            client().parse_delete(response(404, "")),
            Err(ApiError::NotFound)
        ));
    }

    #[test]
    fn parse_bad_json_is_deserialization_error() {
        let err = client().parse_list::<User>(response(200, "not json")).unwrap_err();
        assert!(matches!(err, ApiError::DeserializationError(_)));
    }

    #[test]
    fn every_rejection_goes_through_the_hook() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let c = client().with_error_hook(Arc::new(move |_: &ApiError| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        let _ = c.parse_get::<User>(response(404, ""));
        let _ = c.parse_create::<Reservation>(response(400, "{}"));
        let _ = c.parse_list::<Movie>(response(200, "garbage"));
        assert_eq!(seen.load(Ordering::SeqCst), 3);

        let payload = ReservationPayload {
            usuario: 1,
            funcion: 3,
            cantidad_asientos: 2,
            fecha_reserva: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
        };
        let _ = c.build_create::<Reservation>(&payload).unwrap();
        let _ = c.parse_delete(response(204, ""));
        assert_eq!(seen.load(Ordering::SeqCst), 3, "successes must not hit the hook");
    }

    #[test]
    fn movie_payload_with_title_only() {
        let payload = MoviePayload {
            titulo: "Dune".to_string(),
            sinopsis: None,
            genero: None,
            duracion_minutos: None,
        };
        let req = client().build_create::<Movie>(&payload).unwrap();
        assert_eq!(req.body.as_deref(), Some(r#"{"titulo":"Dune"}"#));
    }
}
