//! Submission lifecycle shared by every form.
//!
//! # Design
//! A form is `Idle` or `Submitting`. `submit` validates first; a validation
//! failure notifies and returns without building a request. While a
//! submission is outstanding a second one is refused, which is the only
//! backpressure there is. On success the input is reset and the server's
//! record is handed back for the caller to merge; on failure the input is
//! kept so the user can retry.

use crate::error::{ApiError, SubmitError};
use crate::forms::ValidationError;
use crate::notification::{Notifier, Severity};
use crate::service::Api;
use crate::transport::Transport;
use crate::types::{Id, Resource};

/// Raw input of one form and the messages it shows.
pub trait FormInput: Default + Clone {
    type Record: Resource;

    fn validate(&self) -> Result<<Self::Record as Resource>::Payload, ValidationError>;

    /// Input pre-filled from an existing record, for editing.
    fn from_record(record: &Self::Record) -> Self;

    fn created_message(record: &Self::Record) -> String;

    fn updated_message(record: &Self::Record) -> String;

    fn failure_message(editing: bool) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormPhase {
    Idle,
    Submitting,
}

/// What a successful submission did.
#[derive(Debug, Clone, PartialEq)]
pub enum Submitted<R> {
    Created(R),
    Updated(R),
}

impl<R> Submitted<R> {
    pub fn record(&self) -> &R {
        match self {
            Submitted::Created(r) | Submitted::Updated(r) => r,
        }
    }

    pub fn into_record(self) -> R {
        match self {
            Submitted::Created(r) | Submitted::Updated(r) => r,
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormController<F> {
    pub input: F,
    phase: FormPhase,
    editing: Option<Id>,
}

impl<F: FormInput> Default for FormController<F> {
    fn default() -> Self {
        Self::new()
    }
}

impl<F: FormInput> FormController<F> {
    pub fn new() -> Self {
        Self {
            input: F::default(),
            phase: FormPhase::Idle,
            editing: None,
        }
    }

    pub fn phase(&self) -> FormPhase {
        self.phase
    }

    /// Whether the submit control should be enabled.
    pub fn can_submit(&self) -> bool {
        self.phase == FormPhase::Idle
    }

    /// Id of the record being edited, if any.
    pub fn editing(&self) -> Option<Id> {
        self.editing
    }

    /// Load `record` into the form; the next submit updates it.
    pub fn edit(&mut self, record: &F::Record) {
        self.input = F::from_record(record);
        self.editing = Some(record.id());
    }

    /// Drop any edits and return to a blank create form.
    pub fn cancel(&mut self) {
        self.input = F::default();
        self.editing = None;
    }

    /// Validate and move to `Submitting`. The caller must follow with
    /// [`FormController::finish`].
    pub fn begin(&mut self) -> Result<<F::Record as Resource>::Payload, SubmitError> {
        if self.phase == FormPhase::Submitting {
            return Err(SubmitError::InFlight);
        }
        let payload = self.input.validate()?;
        self.phase = FormPhase::Submitting;
        Ok(payload)
    }

    /// Settle an outstanding submission with the server's outcome.
    pub fn finish(
        &mut self,
        outcome: Result<F::Record, ApiError>,
    ) -> Result<Submitted<F::Record>, SubmitError> {
        if self.phase != FormPhase::Submitting {
            return Err(SubmitError::NotStarted);
        }
        self.phase = FormPhase::Idle;
        let record = outcome?;
        let submitted = match self.editing {
            Some(_) => Submitted::Updated(record),
            None => Submitted::Created(record),
        };
        self.cancel();
        Ok(submitted)
    }

    /// Run the whole cycle against `api` and report through `notifier`.
    pub fn submit<T: Transport>(
        &mut self,
        api: &Api<T>,
        notifier: &mut Notifier,
    ) -> Result<Submitted<F::Record>, SubmitError> {
        let editing = self.editing;
        let payload = match self.begin() {
            Ok(payload) => payload,
            Err(err) => {
                if let SubmitError::Invalid(ref invalid) = err {
                    notifier.show(invalid.to_string(), Severity::Error);
                }
                return Err(err);
            }
        };

        let service = api.service::<F::Record>();
        let outcome = match editing {
            Some(id) => service.update(id, &payload),
            None => service.create(&payload),
        };

        match self.finish(outcome) {
            Ok(submitted) => {
                let message = match &submitted {
                    Submitted::Created(r) => F::created_message(r),
                    Submitted::Updated(r) => F::updated_message(r),
                };
                notifier.show(message, Severity::Success);
                Ok(submitted)
            }
            Err(err) => {
                notifier.show(F::failure_message(editing.is_some()), Severity::Error);
                Err(err)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::forms::{MovieForm, ReservationForm, UserForm};
    use crate::service::testing::{api, ScriptedTransport};
    use crate::types::{Movie, Reservation};

    fn reservation_form(usuario: &str, funcion: &str, seats: &str) -> FormController<ReservationForm> {
        let mut form = FormController::<ReservationForm>::new();
        form.input = ReservationForm {
            usuario: usuario.to_string(),
            funcion: funcion.to_string(),
            cantidad_asientos: seats.to_string(),
            fecha_reserva: "2026-10-17".to_string(),
        };
        form
    }

    #[test]
    fn invalid_reservation_never_reaches_the_network() {
        let api = api(ScriptedTransport::default());
        let mut notifier = Notifier::new();
        let mut form = reservation_form("", "3", "2");

        let err = form.submit(&api, &mut notifier).unwrap_err();

        assert!(matches!(err, SubmitError::Invalid(ValidationError::MissingSelection { field: "usuario" })));
        assert_eq!(api.transport().sent(), 0);
        let shown = notifier.current().unwrap();
        assert_eq!(shown.severity, Severity::Error);
        assert_eq!(shown.message, "Debe seleccionar un usuario");
        assert_eq!(form.input.funcion, "3", "input is kept");
        assert_eq!(form.phase(), FormPhase::Idle);
    }

    #[test]
    fn successful_create_resets_and_notifies() {
        let api = api(ScriptedTransport::default().reply(
            201,
            r#"{"id":8,"usuario":1,"funcion":3,"cantidad_asientos":2,"fecha_reserva":"2026-10-17"}"#,
        ));
        let mut notifier = Notifier::new();
        let mut form = reservation_form("1", "3", "2");

        let submitted = form.submit(&api, &mut notifier).unwrap();

        assert!(matches!(submitted, Submitted::Created(Reservation { id: 8, .. })));
        assert!(form.input.usuario.is_empty());
        assert!(form.input.cantidad_asientos.is_empty());
        assert_eq!(notifier.current().unwrap().message, "Reserva creada correctamente");
        assert_eq!(notifier.current().unwrap().severity, Severity::Success);
    }

    #[test]
    fn failed_submission_keeps_input() {
        let api = api(ScriptedTransport::default().reply(500, "boom"));
        let mut notifier = Notifier::new();
        let mut form = FormController::<UserForm>::new();
        form.input.nombre = "Ana".to_string();
        form.input.email = "ana@example.com".to_string();

        let err = form.submit(&api, &mut notifier).unwrap_err();

        assert!(matches!(err, SubmitError::Api(ApiError::HttpError { status: 500, .. })));
        assert_eq!(form.input.nombre, "Ana");
        assert_eq!(notifier.current().unwrap().message, "Error al registrar usuario");
        assert!(form.can_submit());
    }

    #[test]
    fn second_submission_while_outstanding_is_refused() {
        let mut form = reservation_form("1", "3", "2");
        form.begin().unwrap();
        assert!(!form.can_submit());
        assert!(matches!(form.begin(), Err(SubmitError::InFlight)));

        form.finish(Err(ApiError::Transport("offline".to_string()))).unwrap_err();
        assert!(form.can_submit());
    }

    #[test]
    fn finish_without_begin_is_refused() {
        let mut form = reservation_form("1", "3", "2");
        let outcome = Ok(Reservation {
            id: 8,
            usuario: 1,
            funcion: 3,
            cantidad_asientos: 2,
            fecha_reserva: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
        });

        assert!(matches!(form.finish(outcome), Err(SubmitError::NotStarted)));
        assert_eq!(form.input.usuario, "1", "input is kept");
        assert_eq!(form.phase(), FormPhase::Idle);
    }

    #[test]
    fn editing_issues_an_update() {
        let api = api(ScriptedTransport::default().reply(200, r#"{"id":4,"titulo":"Dune: Parte Dos"}"#));
        let mut notifier = Notifier::new();
        let mut form = FormController::<MovieForm>::new();
        form.edit(&Movie {
            id: 4,
            titulo: "Dune".to_string(),
            sinopsis: None,
            genero: None,
            duracion_minutos: None,
        });
        form.input.titulo = "Dune: Parte Dos".to_string();

        let submitted = form.submit(&api, &mut notifier).unwrap();

        assert!(matches!(submitted, Submitted::Updated(_)));
        assert_eq!(form.editing(), None);
        let sent = api_requests(&api);
        assert_eq!(sent, vec![("PUT".to_string(), "http://cine.test/api/peliculas/4/".to_string())]);
        assert_eq!(
            notifier.current().unwrap().message,
            "Película \"Dune: Parte Dos\" actualizada exitosamente"
        );
    }

    #[test]
    fn cancel_restores_defaults() {
        let mut form = FormController::<ReservationForm>::new();
        form.edit(&Reservation {
            id: 1,
            usuario: 2,
            funcion: 3,
            cantidad_asientos: 4,
            fecha_reserva: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        });
        assert_eq!(form.input.cantidad_asientos, "4");
        form.cancel();
        assert_eq!(form.editing(), None);
        assert!(form.input.usuario.is_empty());
    }

    fn api_requests(api: &Api<ScriptedTransport>) -> Vec<(String, String)> {
        api.transport()
            .requests
            .borrow()
            .iter()
            .map(|r| (r.method.to_string(), r.path.clone()))
            .collect()
    }
}
