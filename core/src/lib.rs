//! Client core for the cinema reservation admin.
//!
//! # Overview
//! Typed access to the four REST collections of the cinema backend (users,
//! movies, showtimes, reservations) plus the client-side rules that sit in
//! front of them: form validation, the submission lifecycle, transient
//! notifications, and per-view snapshots with foreign-key resolution.
//!
//! # Design
//! - `CineClient` builds `HttpRequest`s and parses `HttpResponse`s without
//!   I/O; a `Transport` executes them. `Api` pairs the two and hands out a
//!   typed `Service` per collection.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.
//! - Views load what they render and return immutable snapshots; nothing is
//!   shared process-wide.

pub mod client;
pub mod collection;
pub mod config;
pub mod display;
pub mod error;
pub mod form;
pub mod forms;
pub mod http;
pub mod notification;
pub mod service;
pub mod transport;
pub mod types;
pub mod views;

pub use client::{CineClient, ErrorHook};
pub use collection::{Collection, Deletable};
pub use config::ClientConfig;
pub use error::{ApiError, ConfigError, SubmitError};
pub use form::{FormController, FormInput, FormPhase, Submitted};
pub use forms::{MovieForm, ReservationForm, ShowtimeForm, UserForm, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use notification::{Notification, Notifier, Severity};
pub use service::{Api, Service};
pub use transport::{Transport, UreqTransport};
pub use types::{
    Envelope, Genre, Id, Movie, MoviePayload, Page, Reservation, ReservationPayload, Resource,
    Showtime, ShowtimePayload, User, UserPayload,
};
pub use views::{Dashboard, MoviesView, ReservationsView, Screen, ShowtimesView, UsersView};

/// `Api` over the blocking `ureq` transport, configured from the environment.
pub fn connect() -> Result<Api<UreqTransport>, ConfigError> {
    let config = ClientConfig::from_env()?;
    Ok(Api::new(CineClient::from_config(&config), UreqTransport::new()))
}
