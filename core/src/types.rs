//! Domain DTOs for the cinema API.
//!
//! # Design
//! These types mirror the backend's JSON schema (Spanish wire names) but are
//! defined independently from the mock-server crate; integration tests catch
//! drift between the two. Records carry the server-assigned `id`; payloads
//! never do.
//!
//! The backend is lenient in what it returns: optional text may come back as
//! `""`, prices as numbers or decimal strings, and the reservation date as a
//! date or a full timestamp. Deserialization absorbs all of these so views
//! only ever see the canonical shape.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

/// Server-assigned identifier. Opaque to the client.
pub type Id = i64;

/// One REST collection of the backend.
pub trait Resource: DeserializeOwned + Clone {
    /// Body sent on create and update.
    type Payload: Serialize;

    /// Path segment under the base URL, e.g. `usuarios`.
    const COLLECTION: &'static str;

    fn id(&self) -> Id;
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: Id,
    pub nombre: String,
    pub email: String,
    pub fecha_registro: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserPayload {
    pub nombre: String,
    pub email: String,
    pub fecha_registro: DateTime<Utc>,
}

impl Resource for User {
    type Payload = UserPayload;
    const COLLECTION: &'static str = "usuarios";

    fn id(&self) -> Id {
        self.id
    }
}

// ---------------------------------------------------------------------------
// Movies
// ---------------------------------------------------------------------------

/// Genres accepted by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Genre {
    Accion,
    Aventura,
    Animacion,
    CienciaFiccion,
    Comedia,
    Documental,
    Drama,
    Fantasia,
    Romance,
    Suspenso,
    Terror,
}

impl Genre {
    pub const ALL: [Genre; 11] = [
        Genre::Accion,
        Genre::Aventura,
        Genre::Animacion,
        Genre::CienciaFiccion,
        Genre::Comedia,
        Genre::Documental,
        Genre::Drama,
        Genre::Fantasia,
        Genre::Romance,
        Genre::Suspenso,
        Genre::Terror,
    ];

    /// Wire value, as sent in `genero`.
    pub fn code(self) -> &'static str {
        match self {
            Genre::Accion => "accion",
            Genre::Aventura => "aventura",
            Genre::Animacion => "animacion",
            Genre::CienciaFiccion => "ciencia_ficcion",
            Genre::Comedia => "comedia",
            Genre::Documental => "documental",
            Genre::Drama => "drama",
            Genre::Fantasia => "fantasia",
            Genre::Romance => "romance",
            Genre::Suspenso => "suspenso",
            Genre::Terror => "terror",
        }
    }

    /// Human label for selectors and cards.
    pub fn label(self) -> &'static str {
        match self {
            Genre::Accion => "Acción",
            Genre::Aventura => "Aventura",
            Genre::Animacion => "Animación",
            Genre::CienciaFiccion => "Ciencia ficción",
            Genre::Comedia => "Comedia",
            Genre::Documental => "Documental",
            Genre::Drama => "Drama",
            Genre::Fantasia => "Fantasía",
            Genre::Romance => "Romance",
            Genre::Suspenso => "Suspenso",
            Genre::Terror => "Terror",
        }
    }
}

impl fmt::Display for Genre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Genre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Genre::ALL
            .into_iter()
            .find(|g| g.code() == s)
            .ok_or_else(|| format!("unknown genre '{s}'"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: Id,
    pub titulo: String,
    #[serde(default, deserialize_with = "blank_as_none", skip_serializing_if = "Option::is_none")]
    pub sinopsis: Option<String>,
    #[serde(default, deserialize_with = "blank_genre_as_none", skip_serializing_if = "Option::is_none")]
    pub genero: Option<Genre>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duracion_minutos: Option<u16>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MoviePayload {
    pub titulo: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sinopsis: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genero: Option<Genre>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duracion_minutos: Option<u16>,
}

impl Resource for Movie {
    type Payload = MoviePayload;
    const COLLECTION: &'static str = "peliculas";

    fn id(&self) -> Id {
        self.id
    }
}

// ---------------------------------------------------------------------------
// Showtimes
// ---------------------------------------------------------------------------

/// A screening ("función") of one movie in one room.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Showtime {
    pub id: Id,
    pub pelicula: Id,
    pub sala: String,
    pub fecha: NaiveDate,
    pub hora_inicio: NaiveTime,
    #[serde(default)]
    pub precio: Option<Decimal>,
}

impl Showtime {
    /// Price with a missing value counted as zero.
    pub fn price_or_zero(&self) -> Decimal {
        self.precio.unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShowtimePayload {
    pub pelicula: Id,
    pub sala: String,
    pub fecha: NaiveDate,
    pub hora_inicio: NaiveTime,
    pub precio: Decimal,
}

impl Resource for Showtime {
    type Payload = ShowtimePayload;
    const COLLECTION: &'static str = "funciones";

    fn id(&self) -> Id {
        self.id
    }
}

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Reservation {
    pub id: Id,
    pub usuario: Id,
    pub funcion: Id,
    pub cantidad_asientos: u8,
    #[serde(deserialize_with = "date_or_timestamp")]
    pub fecha_reserva: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReservationPayload {
    pub usuario: Id,
    pub funcion: Id,
    pub cantidad_asientos: u8,
    pub fecha_reserva: NaiveDate,
}

impl Resource for Reservation {
    type Payload = ReservationPayload;
    const COLLECTION: &'static str = "reservas";

    fn id(&self) -> Id {
        self.id
    }
}

// ---------------------------------------------------------------------------
// List pages
// ---------------------------------------------------------------------------

/// Paginated list wrapper returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Envelope<T> {
    #[serde(default)]
    pub count: Option<u64>,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub previous: Option<String>,
    pub results: Vec<T>,
}

/// A list response: either an envelope or a bare array.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(untagged)]
pub enum Page<T> {
    Envelope(Envelope<T>),
    Bare(Vec<T>),
}

// Branches on the JSON shape first so a bad item reports its own error
// instead of "did not match any variant".
impl<'de, T: DeserializeOwned> Deserialize<'de> for Page<T> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        match serde_json::Value::deserialize(deserializer)? {
            value @ serde_json::Value::Array(_) => Vec::<T>::deserialize(value)
                .map(Page::Bare)
                .map_err(de::Error::custom),
            value @ serde_json::Value::Object(_) => Envelope::<T>::deserialize(value)
                .map(Page::Envelope)
                .map_err(de::Error::custom),
            other => Err(de::Error::custom(format!(
                "expected a list or a paginated envelope, found {other}"
            ))),
        }
    }
}

impl<T> Page<T> {
    /// `results` when the response was an envelope, the array itself otherwise.
    pub fn into_items(self) -> Vec<T> {
        match self {
            Page::Envelope(envelope) => envelope.results,
            Page::Bare(items) => items,
        }
    }
}

// ---------------------------------------------------------------------------
// Lenient field decoders
// ---------------------------------------------------------------------------

fn blank_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

fn blank_genre_as_none<'de, D>(deserializer: D) -> Result<Option<Genre>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(code) = blank_as_none(deserializer)? else {
        return Ok(None);
    };
    match code.parse() {
        Ok(genre) => Ok(Some(genre)),
        Err(_) => {
            tracing::warn!(genero = %code, "unknown genre, shown as absent");
            Ok(None)
        }
    }
}

fn date_or_timestamp<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    if let Ok(date) = NaiveDate::parse_from_str(&raw, "%Y-%m-%d") {
        return Ok(date);
    }
    DateTime::parse_from_rfc3339(&raw)
        .map(|dt| dt.date_naive())
        .map_err(|_| de::Error::custom(format!("invalid date '{raw}'")))
}
