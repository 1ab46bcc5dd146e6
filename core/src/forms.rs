//! Form inputs and their validation rules.
//!
//! Each form keeps its fields as raw text, exactly as typed or selected, and
//! validates into the payload of its resource. Validation runs before any
//! request is built; its messages are shown to the user verbatim.

use chrono::{DateTime, Local, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use thiserror::Error;

use crate::form::FormInput;
use crate::types::{
    Genre, Id, Movie, MoviePayload, Reservation, ReservationPayload, Showtime, ShowtimePayload,
    User, UserPayload,
};

pub const MIN_SEATS: i64 = 1;
pub const MAX_SEATS: i64 = 10;
pub const MAX_DURATION_MINUTES: i64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{}", required_message(.field))]
    Required { field: &'static str },

    #[error("Email válido es requerido")]
    InvalidEmail,

    #[error("{}", selection_message(.field))]
    MissingSelection { field: &'static str },

    #[error("Debe especificar una cantidad válida de asientos (entre 1 y 10)")]
    SeatCount { value: String },

    #[error("La duración debe ser un número de minutos entre 1 y 300")]
    Duration { value: String },

    #[error("El precio debe ser un número mayor o igual a 0")]
    Price { value: String },

    #[error("Género desconocido: {value}")]
    Genre { value: String },

    #[error("Debe seleccionar una fecha")]
    MissingDate { field: &'static str },

    #[error("Fecha inválida: {value}")]
    InvalidDate { field: &'static str, value: String },

    #[error("Hora inválida: {value}")]
    InvalidTime { value: String },
}

impl ValidationError {
    /// Wire name of the offending field.
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::Required { field }
            | ValidationError::MissingSelection { field }
            | ValidationError::MissingDate { field }
            | ValidationError::InvalidDate { field, .. } => field,
            ValidationError::InvalidEmail => "email",
            ValidationError::SeatCount { .. } => "cantidad_asientos",
            ValidationError::Duration { .. } => "duracion_minutos",
            ValidationError::Price { .. } => "precio",
            ValidationError::Genre { .. } => "genero",
            ValidationError::InvalidTime { .. } => "hora_inicio",
        }
    }
}

fn required_message(field: &str) -> String {
    match field {
        "nombre" => "El nombre es requerido".to_string(),
        "titulo" => "El título es requerido".to_string(),
        "sala" => "La sala es requerida".to_string(),
        other => format!("El campo {other} es requerido"),
    }
}

fn selection_message(field: &str) -> String {
    match field {
        "usuario" => "Debe seleccionar un usuario".to_string(),
        "funcion" => "Debe seleccionar una función".to_string(),
        "pelicula" => "Debe seleccionar una película".to_string(),
        other => format!("Debe seleccionar {other}"),
    }
}

// ---------------------------------------------------------------------------
// Field rules
// ---------------------------------------------------------------------------

fn required(value: &str, field: &'static str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required { field });
    }
    Ok(trimmed.to_string())
}

/// Accepts any address containing `@`; no deeper checks.
pub fn validate_email(value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || !trimmed.contains('@') {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(trimmed.to_string())
}

fn selection(value: &str, field: &'static str) -> Result<Id, ValidationError> {
    value
        .trim()
        .parse::<Id>()
        .map_err(|_| ValidationError::MissingSelection { field })
}

/// Seat count must be an integer in `[1, 10]`.
pub fn validate_seat_count(value: &str) -> Result<u8, ValidationError> {
    let invalid = || ValidationError::SeatCount {
        value: value.to_string(),
    };
    let seats: i64 = value.trim().parse().map_err(|_| invalid())?;
    if !(MIN_SEATS..=MAX_SEATS).contains(&seats) {
        return Err(invalid());
    }
    u8::try_from(seats).map_err(|_| invalid())
}

fn optional_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

fn date(value: &str, field: &'static str) -> Result<NaiveDate, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::MissingDate { field });
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        field,
        value: trimmed.to_string(),
    })
}

fn time(value: &str) -> Result<NaiveTime, ValidationError> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(trimmed, "%H:%M"))
        .map_err(|_| ValidationError::InvalidTime {
            value: trimmed.to_string(),
        })
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UserForm {
    pub nombre: String,
    pub email: String,
    /// Kept from the edited record; stamped with the current time on create.
    pub fecha_registro: Option<DateTime<Utc>>,
}

impl FormInput for UserForm {
    type Record = User;

    fn validate(&self) -> Result<UserPayload, ValidationError> {
        Ok(UserPayload {
            nombre: required(&self.nombre, "nombre")?,
            email: validate_email(&self.email)?,
            fecha_registro: self.fecha_registro.unwrap_or_else(Utc::now),
        })
    }

    fn from_record(user: &User) -> Self {
        Self {
            nombre: user.nombre.clone(),
            email: user.email.clone(),
            fecha_registro: Some(user.fecha_registro),
        }
    }

    fn created_message(user: &User) -> String {
        format!("Usuario \"{}\" registrado con éxito", user.nombre)
    }

    fn updated_message(_: &User) -> String {
        "Usuario actualizado exitosamente".to_string()
    }

    fn failure_message(editing: bool) -> &'static str {
        if editing {
            "Error al actualizar usuario"
        } else {
            "Error al registrar usuario"
        }
    }
}

// ---------------------------------------------------------------------------
// Movies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieForm {
    pub titulo: String,
    pub sinopsis: String,
    /// Genre wire code, empty when unset.
    pub genero: String,
    pub duracion_minutos: String,
}

impl MovieForm {
    fn genre(&self) -> Result<Option<Genre>, ValidationError> {
        match optional_text(&self.genero) {
            Some(code) => code
                .parse()
                .map(Some)
                .map_err(|_| ValidationError::Genre { value: code }),
            None => Ok(None),
        }
    }

    fn duration(&self) -> Result<Option<u16>, ValidationError> {
        let Some(raw) = optional_text(&self.duracion_minutos) else {
            return Ok(None);
        };
        let invalid = || ValidationError::Duration { value: raw.clone() };
        let minutes: i64 = raw.parse().map_err(|_| invalid())?;
        if !(1..=MAX_DURATION_MINUTES).contains(&minutes) {
            return Err(invalid());
        }
        u16::try_from(minutes).map(Some).map_err(|_| invalid())
    }
}

impl FormInput for MovieForm {
    type Record = Movie;

    fn validate(&self) -> Result<MoviePayload, ValidationError> {
        Ok(MoviePayload {
            titulo: required(&self.titulo, "titulo")?,
            sinopsis: optional_text(&self.sinopsis),
            genero: self.genre()?,
            duracion_minutos: self.duration()?,
        })
    }

    fn from_record(movie: &Movie) -> Self {
        Self {
            titulo: movie.titulo.clone(),
            sinopsis: movie.sinopsis.clone().unwrap_or_default(),
            genero: movie.genero.map(|g| g.code().to_string()).unwrap_or_default(),
            duracion_minutos: movie
                .duracion_minutos
                .map(|m| m.to_string())
                .unwrap_or_default(),
        }
    }

    fn created_message(movie: &Movie) -> String {
        format!("Película \"{}\" creada exitosamente", movie.titulo)
    }

    fn updated_message(movie: &Movie) -> String {
        format!("Película \"{}\" actualizada exitosamente", movie.titulo)
    }

    fn failure_message(editing: bool) -> &'static str {
        if editing {
            "Error al actualizar la película"
        } else {
            "Error al crear la película"
        }
    }
}

// ---------------------------------------------------------------------------
// Showtimes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShowtimeForm {
    /// Selected movie id, empty when nothing is selected.
    pub pelicula: String,
    pub sala: String,
    /// `YYYY-MM-DD`
    pub fecha: String,
    /// `HH:MM` or `HH:MM:SS`
    pub hora_inicio: String,
    /// Empty means free (0).
    pub precio: String,
}

impl ShowtimeForm {
    fn price(&self) -> Result<Decimal, ValidationError> {
        let Some(raw) = optional_text(&self.precio) else {
            return Ok(Decimal::ZERO);
        };
        let price: Decimal = raw
            .parse()
            .map_err(|_| ValidationError::Price { value: raw.clone() })?;
        if price.is_sign_negative() && !price.is_zero() {
            return Err(ValidationError::Price { value: raw });
        }
        Ok(price)
    }
}

impl FormInput for ShowtimeForm {
    type Record = Showtime;

    fn validate(&self) -> Result<ShowtimePayload, ValidationError> {
        Ok(ShowtimePayload {
            pelicula: selection(&self.pelicula, "pelicula")?,
            sala: required(&self.sala, "sala")?,
            fecha: date(&self.fecha, "fecha")?,
            hora_inicio: time(&self.hora_inicio)?,
            precio: self.price()?,
        })
    }

    fn from_record(showtime: &Showtime) -> Self {
        Self {
            pelicula: showtime.pelicula.to_string(),
            sala: showtime.sala.clone(),
            fecha: showtime.fecha.format("%Y-%m-%d").to_string(),
            hora_inicio: showtime.hora_inicio.format("%H:%M").to_string(),
            precio: showtime.precio.map(|p| p.to_string()).unwrap_or_default(),
        }
    }

    fn created_message(_: &Showtime) -> String {
        "Función creada exitosamente".to_string()
    }

    fn updated_message(_: &Showtime) -> String {
        "Función actualizada exitosamente".to_string()
    }

    fn failure_message(_: bool) -> &'static str {
        "Error al guardar función"
    }
}

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationForm {
    /// Selected user id, empty when nothing is selected.
    pub usuario: String,
    /// Selected showtime id, empty when nothing is selected.
    pub funcion: String,
    pub cantidad_asientos: String,
    /// `YYYY-MM-DD`
    pub fecha_reserva: String,
}

impl ReservationForm {
    /// Blank form whose reservation date is `today`.
    pub fn dated(today: NaiveDate) -> Self {
        Self {
            usuario: String::new(),
            funcion: String::new(),
            cantidad_asientos: String::new(),
            fecha_reserva: today.format("%Y-%m-%d").to_string(),
        }
    }
}

impl Default for ReservationForm {
    fn default() -> Self {
        Self::dated(Local::now().date_naive())
    }
}

impl FormInput for ReservationForm {
    type Record = Reservation;

    fn validate(&self) -> Result<ReservationPayload, ValidationError> {
        Ok(ReservationPayload {
            usuario: selection(&self.usuario, "usuario")?,
            funcion: selection(&self.funcion, "funcion")?,
            cantidad_asientos: validate_seat_count(&self.cantidad_asientos)?,
            fecha_reserva: date(&self.fecha_reserva, "fecha_reserva")?,
        })
    }

    fn from_record(reservation: &Reservation) -> Self {
        Self {
            usuario: reservation.usuario.to_string(),
            funcion: reservation.funcion.to_string(),
            cantidad_asientos: reservation.cantidad_asientos.to_string(),
            fecha_reserva: reservation.fecha_reserva.format("%Y-%m-%d").to_string(),
        }
    }

    fn created_message(_: &Reservation) -> String {
        "Reserva creada correctamente".to_string()
    }

    fn updated_message(_: &Reservation) -> String {
        "Reserva actualizada exitosamente".to_string()
    }

    fn failure_message(editing: bool) -> &'static str {
        if editing {
            "Error al actualizar reserva"
        } else {
            "Error al crear reserva"
        }
    }
}
