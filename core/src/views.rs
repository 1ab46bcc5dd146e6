//! Per-view data snapshots and foreign-key resolution.
//!
//! # Design
//! Each view loads exactly the collections it renders, in one call, and
//! gets back an immutable snapshot. Cross references are resolved against
//! that snapshot; a reference that does not resolve degrades to placeholder
//! text and a zero price instead of failing the view.

use rust_decimal::Decimal;

use crate::collection::Collection;
use crate::display;
use crate::error::ApiError;
use crate::notification::{Notifier, Severity};
use crate::service::Api;
use crate::transport::Transport;
use crate::types::{Id, Movie, Reservation, Showtime, User};

pub const USER_NOT_FOUND: &str = "Usuario no encontrado";
pub const MOVIE_NOT_FOUND: &str = "Película no encontrada";
pub const SHOWTIME_NOT_FOUND: &str = "Función no encontrada";
pub const ROOM_UNSPECIFIED: &str = "Sala no especificada";
pub const PLACEHOLDER: &str = "-";

/// `Ana (ana@example.com)`, as shown in user selectors.
pub fn user_label(user: &User) -> String {
    format!("{} ({})", user.nombre, user.email)
}

fn movie_title(movies: &Collection<Movie>, id: Id) -> &str {
    movies
        .find(id)
        .map(|m| m.titulo.as_str())
        .unwrap_or(MOVIE_NOT_FOUND)
}

/// `Dune - 17/10/2026 18:30 - Sala 1 - COP $12.000`, as shown in showtime
/// selectors.
fn showtime_label(movies: &Collection<Movie>, showtime: &Showtime) -> String {
    format!(
        "{} - {} {} - {} - {}",
        movie_title(movies, showtime.pelicula),
        display::short_date(showtime.fecha),
        display::short_time(showtime.hora_inicio),
        showtime.sala,
        display::cop(showtime.price_or_zero()),
    )
}

/// A view that loads as a whole and reports how the load went.
pub trait Screen: Sized {
    /// Shown once the data arrives; `None` loads silently.
    const LOADED: Option<&'static str>;
    const LOAD_FAILED: &'static str;

    fn fetch<T: Transport>(api: &Api<T>) -> Result<Self, ApiError>;

    /// Load and report the outcome through `notifier`.
    fn open<T: Transport>(api: &Api<T>, notifier: &mut Notifier) -> Result<Self, ApiError> {
        match Self::fetch(api) {
            Ok(view) => {
                if let Some(message) = Self::LOADED {
                    notifier.show(message, Severity::Success);
                }
                Ok(view)
            }
            Err(err) => {
                notifier.show(Self::LOAD_FAILED, Severity::Error);
                Err(err)
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Users / Movies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct UsersView {
    pub users: Collection<User>,
}

impl UsersView {
    pub fn load<T: Transport>(api: &Api<T>) -> Result<Self, ApiError> {
        Ok(Self {
            users: Collection::load(api)?,
        })
    }

    /// Registration date as shown on user cards.
    pub fn registered_on(user: &User) -> String {
        display::short_date(user.fecha_registro.date_naive())
    }
}

impl Screen for UsersView {
    const LOADED: Option<&'static str> = None;
    const LOAD_FAILED: &'static str = "Error al cargar usuarios";

    fn fetch<T: Transport>(api: &Api<T>) -> Result<Self, ApiError> {
        Self::load(api)
    }
}

/// One detail row of a movie card. Absent optional fields produce no row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DetailRow {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MoviesView {
    pub movies: Collection<Movie>,
}

impl MoviesView {
    pub fn load<T: Transport>(api: &Api<T>) -> Result<Self, ApiError> {
        Ok(Self {
            movies: Collection::load(api)?,
        })
    }

    pub fn details(movie: &Movie) -> Vec<DetailRow> {
        let mut rows = Vec::new();
        if let Some(genre) = movie.genero {
            rows.push(DetailRow {
                label: "Género",
                value: genre.label().to_string(),
            });
        }
        if let Some(minutes) = movie.duracion_minutos {
            rows.push(DetailRow {
                label: "Duración",
                value: format!("{minutes} min"),
            });
        }
        if let Some(synopsis) = &movie.sinopsis {
            rows.push(DetailRow {
                label: "Sinopsis",
                value: synopsis.clone(),
            });
        }
        rows
    }
}

impl Screen for MoviesView {
    const LOADED: Option<&'static str> = Some("Películas cargadas correctamente");
    const LOAD_FAILED: &'static str = "Error al cargar las películas";

    fn fetch<T: Transport>(api: &Api<T>) -> Result<Self, ApiError> {
        Self::load(api)
    }
}

// ---------------------------------------------------------------------------
// Showtimes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ShowtimesView {
    pub showtimes: Collection<Showtime>,
    pub movies: Collection<Movie>,
}

impl ShowtimesView {
    pub fn load<T: Transport>(api: &Api<T>) -> Result<Self, ApiError> {
        Ok(Self {
            showtimes: Collection::load(api)?,
            movies: Collection::load(api)?,
        })
    }

    pub fn movie_title(&self, id: Id) -> &str {
        movie_title(&self.movies, id)
    }

    pub fn label(&self, showtime: &Showtime) -> String {
        showtime_label(&self.movies, showtime)
    }
}

impl Screen for ShowtimesView {
    const LOADED: Option<&'static str> = None;
    const LOAD_FAILED: &'static str = "Error al cargar datos";

    fn fetch<T: Transport>(api: &Api<T>) -> Result<Self, ApiError> {
        Self::load(api)
    }
}

// ---------------------------------------------------------------------------
// Reservations
// ---------------------------------------------------------------------------

/// Resolved showtime details for a reservation card.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShowtimeInfo {
    pub titulo: String,
    pub fecha: String,
    pub hora: String,
    pub sala: String,
    pub precio: Decimal,
}

impl ShowtimeInfo {
    fn not_found() -> Self {
        Self {
            titulo: SHOWTIME_NOT_FOUND.to_string(),
            fecha: PLACEHOLDER.to_string(),
            hora: PLACEHOLDER.to_string(),
            sala: PLACEHOLDER.to_string(),
            precio: Decimal::ZERO,
        }
    }
}

/// Everything a reservation card shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationCard {
    pub id: Id,
    pub fecha_reserva: String,
    pub cliente: String,
    pub funcion: ShowtimeInfo,
    pub cantidad_asientos: u8,
    pub total: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReservationsView {
    pub reservations: Collection<Reservation>,
    pub users: Collection<User>,
    pub showtimes: Collection<Showtime>,
    pub movies: Collection<Movie>,
}

impl ReservationsView {
    pub fn load<T: Transport>(api: &Api<T>) -> Result<Self, ApiError> {
        Ok(Self {
            reservations: Collection::load(api)?,
            users: Collection::load(api)?,
            showtimes: Collection::load(api)?,
            movies: Collection::load(api)?,
        })
    }

    pub fn user_name(&self, id: Id) -> &str {
        self.users
            .find(id)
            .map(|u| u.nombre.as_str())
            .unwrap_or(USER_NOT_FOUND)
    }

    pub fn showtime_info(&self, id: Id) -> ShowtimeInfo {
        let Some(showtime) = self.showtimes.find(id) else {
            return ShowtimeInfo::not_found();
        };
        let sala = if showtime.sala.trim().is_empty() {
            ROOM_UNSPECIFIED.to_string()
        } else {
            showtime.sala.clone()
        };
        ShowtimeInfo {
            titulo: movie_title(&self.movies, showtime.pelicula).to_string(),
            fecha: display::short_date(showtime.fecha),
            hora: display::short_time(showtime.hora_inicio),
            sala,
            precio: showtime.price_or_zero(),
        }
    }

    /// Price times seats; zero when the showtime or its price is missing.
    pub fn total(&self, reservation: &Reservation) -> Decimal {
        self.showtimes
            .find(reservation.funcion)
            .and_then(|s| s.precio)
            .map(|price| price * Decimal::from(reservation.cantidad_asientos))
            .unwrap_or(Decimal::ZERO)
    }

    pub fn card(&self, reservation: &Reservation) -> ReservationCard {
        ReservationCard {
            id: reservation.id,
            fecha_reserva: display::long_date(reservation.fecha_reserva),
            cliente: self.user_name(reservation.usuario).to_string(),
            funcion: self.showtime_info(reservation.funcion),
            cantidad_asientos: reservation.cantidad_asientos,
            total: display::cop(self.total(reservation)),
        }
    }

    pub fn cards(&self) -> Vec<ReservationCard> {
        self.reservations.iter().map(|r| self.card(r)).collect()
    }

    /// Selector options for the reservation form: `(id, label)`.
    pub fn user_options(&self) -> Vec<(Id, String)> {
        self.users.iter().map(|u| (u.id, user_label(u))).collect()
    }

    pub fn showtime_options(&self) -> Vec<(Id, String)> {
        self.showtimes
            .iter()
            .map(|s| (s.id, showtime_label(&self.movies, s)))
            .collect()
    }

    /// The form can only be submitted when there is something to pick.
    pub fn can_reserve(&self) -> bool {
        !self.users.is_empty() && !self.showtimes.is_empty()
    }
}

impl Screen for ReservationsView {
    const LOADED: Option<&'static str> = None;
    const LOAD_FAILED: &'static str = "Error al cargar datos";

    fn fetch<T: Transport>(api: &Api<T>) -> Result<Self, ApiError> {
        Self::load(api)
    }
}

// ---------------------------------------------------------------------------
// Dashboard
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub peliculas: usize,
    pub usuarios: usize,
    pub funciones: usize,
    pub reservas: usize,
}

/// Landing page: counts and the latest reservations.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dashboard {
    pub reservations: ReservationsView,
}

impl Dashboard {
    pub fn load<T: Transport>(api: &Api<T>) -> Result<Self, ApiError> {
        Ok(Self {
            reservations: ReservationsView::load(api)?,
        })
    }

    pub fn stats(&self) -> Stats {
        let view = &self.reservations;
        Stats {
            peliculas: view.movies.len(),
            usuarios: view.users.len(),
            funciones: view.showtimes.len(),
            reservas: view.reservations.len(),
        }
    }

    /// Up to `limit` reservations, newest reservation date first.
    pub fn recent(&self, limit: usize) -> Vec<ReservationCard> {
        let mut latest: Vec<&Reservation> = self.reservations.reservations.iter().collect();
        latest.sort_by(|a, b| b.fecha_reserva.cmp(&a.fecha_reserva).then(b.id.cmp(&a.id)));
        latest
            .into_iter()
            .take(limit)
            .map(|r| self.reservations.card(r))
            .collect()
    }
}

impl Screen for Dashboard {
    const LOADED: Option<&'static str> = Some("Datos cargados correctamente");
    const LOAD_FAILED: &'static str = "Error al cargar los datos iniciales";

    fn fetch<T: Transport>(api: &Api<T>) -> Result<Self, ApiError> {
        Self::load(api)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};

    use super::*;
    use crate::service::testing::{api, ScriptedTransport};
    use crate::types::Genre;

    fn view() -> ReservationsView {
        let users = vec![User {
            id: 1,
            nombre: "Ana".to_string(),
            email: "ana@example.com".to_string(),
            fecha_registro: Utc.with_ymd_and_hms(2026, 10, 1, 8, 0, 0).unwrap(),
        }];
        let movies = vec![Movie {
            id: 2,
            titulo: "Dune".to_string(),
            sinopsis: None,
            genero: None,
            duracion_minutos: None,
        }];
        let showtimes = vec![
            Showtime {
                id: 3,
                pelicula: 2,
                sala: "Sala 1".to_string(),
                fecha: NaiveDate::from_ymd_opt(2026, 10, 17).unwrap(),
                hora_inicio: NaiveTime::from_hms_opt(18, 30, 0).unwrap(),
                precio: Some(Decimal::new(12000, 0)),
            },
            Showtime {
                id: 4,
                pelicula: 99,
                sala: " ".to_string(),
                fecha: NaiveDate::from_ymd_opt(2026, 10, 18).unwrap(),
                hora_inicio: NaiveTime::from_hms_opt(21, 0, 0).unwrap(),
                precio: None,
            },
        ];
        let reservations = vec![
            Reservation {
                id: 10,
                usuario: 1,
                funcion: 3,
                cantidad_asientos: 3,
                fecha_reserva: NaiveDate::from_ymd_opt(2026, 10, 15).unwrap(),
            },
            Reservation {
                id: 11,
                usuario: 42,
                funcion: 77,
                cantidad_asientos: 2,
                fecha_reserva: NaiveDate::from_ymd_opt(2026, 10, 16).unwrap(),
            },
        ];
        ReservationsView {
            reservations: reservations.into(),
            users: users.into(),
            showtimes: showtimes.into(),
            movies: movies.into(),
        }
    }

    #[test]
    fn total_is_price_times_seats() {
        let view = view();
        let first = view.reservations.find(10).unwrap();
        assert_eq!(view.total(first), Decimal::new(36000, 0));
    }

    #[test]
    fn total_is_zero_without_price_or_showtime() {
        let view = view();
        let mut reservation = view.reservations.find(10).unwrap().clone();
        reservation.funcion = 4;
        assert_eq!(view.total(&reservation), Decimal::ZERO);
        reservation.funcion = 77;
        assert_eq!(view.total(&reservation), Decimal::ZERO);
    }

    #[test]
    fn missing_showtime_degrades_to_placeholders() {
        let info = view().showtime_info(77);
        assert_eq!(info.titulo, "Función no encontrada");
        assert_eq!(info.fecha, "-");
        assert_eq!(info.hora, "-");
        assert_eq!(info.sala, "-");
        assert_eq!(info.precio, Decimal::ZERO);
    }

    #[test]
    fn showtime_with_missing_movie_and_blank_room() {
        let info = view().showtime_info(4);
        assert_eq!(info.titulo, "Película no encontrada");
        assert_eq!(info.sala, "Sala no especificada");
        assert_eq!(info.fecha, "18/10/2026");
        assert_eq!(info.hora, "21:00");
    }

    #[test]
    fn unknown_user_degrades_to_placeholder() {
        let view = view();
        assert_eq!(view.user_name(1), "Ana");
        assert_eq!(view.user_name(42), "Usuario no encontrado");
    }

    #[test]
    fn card_renders_resolved_reservation() {
        let view = view();
        let card = view.card(view.reservations.find(10).unwrap());
        assert_eq!(card.cliente, "Ana");
        assert_eq!(card.funcion.titulo, "Dune");
        assert_eq!(card.fecha_reserva, "15 de octubre de 2026");
        assert_eq!(card.total, "COP $36.000");
    }

    #[test]
    fn selector_labels() {
        let view = view();
        assert_eq!(view.user_options(), vec![(1, "Ana (ana@example.com)".to_string())]);
        assert_eq!(
            view.showtime_options()[0].1,
            "Dune - 17/10/2026 18:30 - Sala 1 - COP $12.000"
        );
        assert!(view.can_reserve());
        assert!(!ReservationsView::default().can_reserve());
    }

    #[test]
    fn dashboard_counts_and_orders_recent() {
        let dashboard = Dashboard {
            reservations: view(),
        };
        assert_eq!(
            dashboard.stats(),
            Stats {
                peliculas: 1,
                usuarios: 1,
                funciones: 2,
                reservas: 2
            }
        );
        let recent = dashboard.recent(1);
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, 11);
    }

    #[test]
    fn movie_details_skip_absent_fields() {
        let mut movie = Movie {
            id: 1,
            titulo: "Dune".to_string(),
            sinopsis: None,
            genero: None,
            duracion_minutos: None,
        };
        assert!(MoviesView::details(&movie).is_empty());

        movie.genero = Some(Genre::CienciaFiccion);
        movie.duracion_minutos = Some(155);
        let rows = MoviesView::details(&movie);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].value, "Ciencia ficción");
        assert_eq!(rows[1].value, "155 min");
    }

    #[test]
    fn opening_movies_reports_success() {
        let api = api(ScriptedTransport::default().reply(200, r#"[{"id":1,"titulo":"Dune"}]"#));
        let mut notifier = Notifier::new();

        let view = MoviesView::open(&api, &mut notifier).unwrap();

        assert_eq!(view.movies.len(), 1);
        let shown = notifier.current().unwrap();
        assert_eq!(shown.severity, Severity::Success);
        assert_eq!(shown.message, "Películas cargadas correctamente");
    }

    #[test]
    fn opening_users_is_silent_until_it_fails() {
        let ok = api(ScriptedTransport::default().reply(200, "[]"));
        let mut notifier = Notifier::new();
        UsersView::open(&ok, &mut notifier).unwrap();
        assert!(notifier.current().is_none());

        let down = api(ScriptedTransport::default().fail("connection refused"));
        let err = UsersView::open(&down, &mut notifier).unwrap_err();
        assert!(matches!(err, ApiError::Transport(_)));
        assert_eq!(notifier.current().unwrap().message, "Error al cargar usuarios");
    }

    #[test]
    fn dashboard_failure_is_reported() {
        // Reservations load, users fail.
        let api = api(
            ScriptedTransport::default()
                .reply(200, "[]")
                .reply(500, "boom"),
        );
        let mut notifier = Notifier::new();

        let err = Dashboard::open(&api, &mut notifier).unwrap_err();

        assert!(matches!(err, ApiError::HttpError { status: 500, .. }));
        let shown = notifier.current().unwrap();
        assert_eq!(shown.severity, Severity::Error);
        assert_eq!(shown.message, "Error al cargar los datos iniciales");
    }

    #[test]
    fn reservations_screen_reports_generic_load_error() {
        let api = api(ScriptedTransport::default());
        let mut notifier = Notifier::new();
        assert!(ReservationsView::open(&api, &mut notifier).is_err());
        assert_eq!(notifier.current().unwrap().message, "Error al cargar datos");
        assert!(ShowtimesView::open(&api, &mut notifier).is_err());
    }
}
