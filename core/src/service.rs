//! Resource services: one CRUD surface per REST collection.
//!
//! `Api` pairs a `CineClient` with a `Transport`; `Service` is a typed view
//! of one collection on top of it. Services keep no state of their own and
//! never touch local collections; callers merge results themselves.

use std::marker::PhantomData;

use crate::client::CineClient;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{Id, Movie, Reservation, Resource, Showtime, User};

#[derive(Debug, Clone)]
pub struct Api<T> {
    client: CineClient,
    transport: T,
}

impl<T: Transport> Api<T> {
    pub fn new(client: CineClient, transport: T) -> Self {
        Self { client, transport }
    }

    pub fn client(&self) -> &CineClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn users(&self) -> Service<'_, User, T> {
        self.service()
    }

    pub fn movies(&self) -> Service<'_, Movie, T> {
        self.service()
    }

    pub fn showtimes(&self) -> Service<'_, Showtime, T> {
        self.service()
    }

    pub fn reservations(&self) -> Service<'_, Reservation, T> {
        self.service()
    }

    /// Typed service for any collection.
    pub fn service<R: Resource>(&self) -> Service<'_, R, T> {
        Service {
            api: self,
            _resource: PhantomData,
        }
    }

    fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        self.transport
            .execute(request)
            .map_err(|e| self.client.reject(e))
    }
}

pub struct Service<'a, R, T> {
    api: &'a Api<T>,
    _resource: PhantomData<R>,
}

impl<R: Resource, T: Transport> Service<'_, R, T> {
    /// Fetch the whole collection, normalizing paginated responses.
    pub fn list(&self) -> Result<Vec<R>, ApiError> {
        let client = &self.api.client;
        let response = self.api.send(client.build_list::<R>())?;
        client.parse_list(response)
    }

    pub fn get(&self, id: Id) -> Result<R, ApiError> {
        let client = &self.api.client;
        let response = self.api.send(client.build_get::<R>(id))?;
        client.parse_get(response)
    }

    pub fn create(&self, payload: &R::Payload) -> Result<R, ApiError> {
        let client = &self.api.client;
        let response = self.api.send(client.build_create::<R>(payload)?)?;
        client.parse_create(response)
    }

    pub fn update(&self, id: Id, payload: &R::Payload) -> Result<R, ApiError> {
        let client = &self.api.client;
        let response = self.api.send(client.build_update::<R>(id, payload)?)?;
        client.parse_update(response)
    }

    pub fn delete(&self, id: Id) -> Result<(), ApiError> {
        let client = &self.api.client;
        let response = self.api.send(client.build_delete::<R>(id))?;
        client.parse_delete(response)
    }
}
