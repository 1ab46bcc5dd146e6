//! In-memory stand-in for the cinema REST backend.
//!
//! Serves `/api/{usuarios,peliculas,funciones,reservas}/` with integer ids
//! assigned by the server, Django-style trailing slashes, an optional
//! `{count, next, previous, results}` list envelope, and field-keyed 400
//! responses when input is rejected.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};

pub const GENRES: [&str; 11] = [
    "accion",
    "aventura",
    "animacion",
    "ciencia_ficcion",
    "comedia",
    "documental",
    "drama",
    "fantasia",
    "romance",
    "suspenso",
    "terror",
];

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub id: i64,
    pub nombre: String,
    pub email: String,
    pub fecha_registro: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct UserInput {
    pub nombre: String,
    pub email: String,
    #[serde(default)]
    pub fecha_registro: Option<DateTime<Utc>>,
}

/// Blank optional text is stored and returned as `""`.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: i64,
    pub titulo: String,
    pub sinopsis: String,
    pub genero: String,
    pub duracion_minutos: Option<u16>,
}

#[derive(Deserialize)]
pub struct MovieInput {
    pub titulo: String,
    #[serde(default)]
    pub sinopsis: Option<String>,
    #[serde(default)]
    pub genero: Option<String>,
    #[serde(default)]
    pub duracion_minutos: Option<i64>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Showtime {
    pub id: i64,
    pub pelicula: i64,
    pub sala: String,
    pub fecha: NaiveDate,
    pub hora_inicio: NaiveTime,
    pub precio: Option<Decimal>,
}

#[derive(Deserialize)]
pub struct ShowtimeInput {
    pub pelicula: i64,
    pub sala: String,
    pub fecha: NaiveDate,
    pub hora_inicio: NaiveTime,
    #[serde(default)]
    pub precio: Option<Decimal>,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Reservation {
    pub id: i64,
    pub usuario: i64,
    pub funcion: i64,
    pub cantidad_asientos: i64,
    pub fecha_reserva: NaiveDate,
}

#[derive(Deserialize)]
pub struct ReservationInput {
    pub usuario: i64,
    pub funcion: i64,
    pub cantidad_asientos: i64,
    #[serde(default)]
    pub fecha_reserva: Option<NaiveDate>,
}

// ---------------------------------------------------------------------------
// Storage
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct Table<T> {
    rows: BTreeMap<i64, T>,
    last_id: i64,
}

impl<T> Default for Table<T> {
    fn default() -> Self {
        Self {
            rows: BTreeMap::new(),
            last_id: 0,
        }
    }
}

impl<T> Table<T> {
    fn next_id(&self) -> i64 {
        self.last_id + 1
    }

    fn insert(&mut self, id: i64, row: T) {
        self.last_id = self.last_id.max(id);
        self.rows.insert(id, row);
    }

    fn contains(&self, id: i64) -> bool {
        self.rows.contains_key(&id)
    }
}

#[derive(Debug, Default)]
pub struct Store {
    pub usuarios: Table<User>,
    pub peliculas: Table<Movie>,
    pub funciones: Table<Showtime>,
    pub reservas: Table<Reservation>,
}

pub type Db = Arc<RwLock<Store>>;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Field name to messages, as Django REST framework reports them.
pub type FieldErrors = BTreeMap<&'static str, Vec<String>>;

#[derive(Debug)]
pub enum Rejection {
    NotFound,
    Invalid(FieldErrors),
}

impl Rejection {
    fn field(field: &'static str, message: &str) -> Self {
        Rejection::Invalid(BTreeMap::from([(field, vec![message.to_string()])]))
    }
}

impl IntoResponse for Rejection {
    fn into_response(self) -> Response {
        match self {
            Rejection::NotFound => (
                StatusCode::NOT_FOUND,
                Json(serde_json::json!({"detail": "No encontrado."})),
            )
                .into_response(),
            Rejection::Invalid(errors) => (StatusCode::BAD_REQUEST, Json(errors)).into_response(),
        }
    }
}

// ---------------------------------------------------------------------------
// Collections
// ---------------------------------------------------------------------------

/// One REST collection backed by a `Store` table.
pub trait Record: Clone + Serialize + Send + Sync + 'static {
    type Input: DeserializeOwned + Send + 'static;

    const COLLECTION: &'static str;

    fn table(store: &Store) -> &Table<Self>;

    fn table_mut(store: &mut Store) -> &mut Table<Self>;

    /// Validate `input` against the current store and build the row.
    fn build(id: i64, input: Self::Input, store: &Store) -> Result<Self, Rejection>;
}

impl Record for User {
    type Input = UserInput;
    const COLLECTION: &'static str = "usuarios";

    fn table(store: &Store) -> &Table<Self> {
        &store.usuarios
    }

    fn table_mut(store: &mut Store) -> &mut Table<Self> {
        &mut store.usuarios
    }

    fn build(id: i64, input: UserInput, _: &Store) -> Result<Self, Rejection> {
        if input.nombre.trim().is_empty() {
            return Err(Rejection::field("nombre", "Este campo no puede estar en blanco."));
        }
        if !input.email.contains('@') {
            return Err(Rejection::field("email", "Introduzca una dirección de correo válida."));
        }
        Ok(User {
            id,
            nombre: input.nombre.trim().to_string(),
            email: input.email.trim().to_string(),
            fecha_registro: input.fecha_registro.unwrap_or_else(Utc::now),
        })
    }
}

impl Record for Movie {
    type Input = MovieInput;
    const COLLECTION: &'static str = "peliculas";

    fn table(store: &Store) -> &Table<Self> {
        &store.peliculas
    }

    fn table_mut(store: &mut Store) -> &mut Table<Self> {
        &mut store.peliculas
    }

    fn build(id: i64, input: MovieInput, _: &Store) -> Result<Self, Rejection> {
        if input.titulo.trim().is_empty() {
            return Err(Rejection::field("titulo", "Este campo no puede estar en blanco."));
        }
        let genero = input.genero.unwrap_or_default();
        if !genero.is_empty() && !GENRES.contains(&genero.as_str()) {
            return Err(Rejection::field("genero", "Elija una opción válida."));
        }
        let duracion_minutos = match input.duracion_minutos {
            Some(minutes) if (1..=300).contains(&minutes) => Some(minutes as u16),
            Some(_) => {
                return Err(Rejection::field(
                    "duracion_minutos",
                    "Asegúrese de que este valor esté entre 1 y 300.",
                ))
            }
            None => None,
        };
        Ok(Movie {
            id,
            titulo: input.titulo.trim().to_string(),
            sinopsis: input.sinopsis.unwrap_or_default(),
            genero,
            duracion_minutos,
        })
    }
}

impl Record for Showtime {
    type Input = ShowtimeInput;
    const COLLECTION: &'static str = "funciones";

    fn table(store: &Store) -> &Table<Self> {
        &store.funciones
    }

    fn table_mut(store: &mut Store) -> &mut Table<Self> {
        &mut store.funciones
    }

    fn build(id: i64, input: ShowtimeInput, store: &Store) -> Result<Self, Rejection> {
        if !store.peliculas.contains(input.pelicula) {
            return Err(Rejection::field("pelicula", "Clave primaria inválida."));
        }
        if input.sala.trim().is_empty() {
            return Err(Rejection::field("sala", "Este campo no puede estar en blanco."));
        }
        if input.precio.is_some_and(|p| p < Decimal::ZERO) {
            return Err(Rejection::field("precio", "Asegúrese de que este valor sea mayor o igual a 0."));
        }
        Ok(Showtime {
            id,
            pelicula: input.pelicula,
            sala: input.sala.trim().to_string(),
            fecha: input.fecha,
            hora_inicio: input.hora_inicio,
            precio: input.precio,
        })
    }
}

impl Record for Reservation {
    type Input = ReservationInput;
    const COLLECTION: &'static str = "reservas";

    fn table(store: &Store) -> &Table<Self> {
        &store.reservas
    }

    fn table_mut(store: &mut Store) -> &mut Table<Self> {
        &mut store.reservas
    }

    fn build(id: i64, input: ReservationInput, store: &Store) -> Result<Self, Rejection> {
        if !store.usuarios.contains(input.usuario) {
            return Err(Rejection::field("usuario", "Clave primaria inválida."));
        }
        if !store.funciones.contains(input.funcion) {
            return Err(Rejection::field("funcion", "Clave primaria inválida."));
        }
        if !(1..=10).contains(&input.cantidad_asientos) {
            return Err(Rejection::field(
                "cantidad_asientos",
                "Asegúrese de que este valor esté entre 1 y 10.",
            ));
        }
        Ok(Reservation {
            id,
            usuario: input.usuario,
            funcion: input.funcion,
            cantidad_asientos: input.cantidad_asientos,
            fecha_reserva: input.fecha_reserva.unwrap_or_else(|| Utc::now().date_naive()),
        })
    }
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug)]
pub struct Options {
    /// Wrap list responses in `{count, next, previous, results}`.
    pub paginate: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { paginate: true }
    }
}

#[derive(Clone)]
struct AppState {
    db: Db,
    options: Options,
}

pub fn app() -> Router {
    app_with(Options::default())
}

pub fn app_with(options: Options) -> Router {
    let state = AppState {
        db: Arc::new(RwLock::new(Store::default())),
        options,
    };
    Router::new()
        .merge(collection::<User>())
        .merge(collection::<Movie>())
        .merge(collection::<Showtime>())
        .merge(collection::<Reservation>())
        .with_state(state)
}

fn collection<R: Record>() -> Router<AppState> {
    Router::new()
        .route(
            &format!("/api/{}/", R::COLLECTION),
            get(list_records::<R>).post(create_record::<R>),
        )
        .route(
            &format!("/api/{}/{{id}}/", R::COLLECTION),
            get(get_record::<R>)
                .put(update_record::<R>)
                .delete(delete_record::<R>),
        )
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with(listener, Options::default()).await
}

pub async fn run_with(listener: TcpListener, options: Options) -> Result<(), std::io::Error> {
    axum::serve(listener, app_with(options)).await
}

#[derive(Serialize)]
#[serde(untagged)]
enum ListBody<R> {
    Page {
        count: usize,
        next: Option<String>,
        previous: Option<String>,
        results: Vec<R>,
    },
    Bare(Vec<R>),
}

async fn list_records<R: Record>(State(state): State<AppState>) -> Json<ListBody<R>> {
    let store = state.db.read().await;
    let rows: Vec<R> = R::table(&store).rows.values().cloned().collect();
    if state.options.paginate {
        Json(ListBody::Page {
            count: rows.len(),
            next: None,
            previous: None,
            results: rows,
        })
    } else {
        Json(ListBody::Bare(rows))
    }
}

async fn create_record<R: Record>(
    State(state): State<AppState>,
    Json(input): Json<R::Input>,
) -> Result<(StatusCode, Json<R>), Rejection> {
    let mut store = state.db.write().await;
    let id = R::table(&store).next_id();
    let record = R::build(id, input, &store)?;
    R::table_mut(&mut store).insert(id, record.clone());
    tracing::info!(collection = R::COLLECTION, id, "created");
    Ok((StatusCode::CREATED, Json(record)))
}

async fn get_record<R: Record>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<R>, Rejection> {
    let store = state.db.read().await;
    R::table(&store)
        .rows
        .get(&id)
        .cloned()
        .map(Json)
        .ok_or(Rejection::NotFound)
}

async fn update_record<R: Record>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(input): Json<R::Input>,
) -> Result<Json<R>, Rejection> {
    let mut store = state.db.write().await;
    if !R::table(&store).contains(id) {
        return Err(Rejection::NotFound);
    }
    let record = R::build(id, input, &store)?;
    R::table_mut(&mut store).insert(id, record.clone());
    tracing::info!(collection = R::COLLECTION, id, "updated");
    Ok(Json(record))
}

async fn delete_record<R: Record>(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, Rejection> {
    let mut store = state.db.write().await;
    R::table_mut(&mut store)
        .rows
        .remove(&id)
        .map(|_| {
            tracing::info!(collection = R::COLLECTION, id, "deleted");
            StatusCode::NO_CONTENT
        })
        .ok_or(Rejection::NotFound)
}
