//! Immutable snapshots of loaded collections.
//!
//! After a mutation the caller either reloads the collection or derives a
//! new snapshot with the single changed record spliced in. Snapshots never
//! change in place.

use crate::error::ApiError;
use crate::form::Submitted;
use crate::notification::{Notifier, Severity};
use crate::service::Api;
use crate::transport::Transport;
use crate::types::{Id, Movie, Reservation, Resource, Showtime, User};

/// Messages shown after deleting a record of this kind.
pub trait Deletable: Resource {
    const DELETED: &'static str;
    const DELETE_FAILED: &'static str;
}

impl Deletable for User {
    const DELETED: &'static str = "Usuario eliminado exitosamente";
    const DELETE_FAILED: &'static str = "Error al eliminar usuario";
}

impl Deletable for Movie {
    const DELETED: &'static str = "Película eliminada exitosamente";
    const DELETE_FAILED: &'static str = "Error al eliminar la película";
}

impl Deletable for Showtime {
    const DELETED: &'static str = "Función eliminada exitosamente";
    const DELETE_FAILED: &'static str = "Error al eliminar función";
}

impl Deletable for Reservation {
    const DELETED: &'static str = "Reserva eliminada exitosamente";
    const DELETE_FAILED: &'static str = "Error al eliminar reserva";
}

#[derive(Debug, Clone, PartialEq)]
pub struct Collection<R> {
    items: Vec<R>,
}

impl<R> Default for Collection<R> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<R: Resource> From<Vec<R>> for Collection<R> {
    fn from(items: Vec<R>) -> Self {
        Self { items }
    }
}

impl<R: Resource> Collection<R> {
    /// Fetch the whole collection.
    pub fn load<T: Transport>(api: &Api<T>) -> Result<Self, ApiError> {
        api.service::<R>().list().map(Self::from)
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, R> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[R] {
        &self.items
    }

    pub fn find(&self, id: Id) -> Option<&R> {
        self.items.iter().find(|r| r.id() == id)
    }

    pub fn contains(&self, id: Id) -> bool {
        self.find(id).is_some()
    }

    /// Append a record the server just created.
    pub fn with_created(mut self, record: R) -> Self {
        self.items.push(record);
        self
    }

    /// Swap in the server's copy of an updated record. Appends it when the
    /// snapshot did not have it.
    pub fn with_updated(mut self, record: R) -> Self {
        match self.items.iter().position(|r| r.id() == record.id()) {
            Some(index) => self.items[index] = record,
            None => self.items.push(record),
        }
        self
    }

    /// Merge the result of a form submission.
    pub fn with_submitted(self, submitted: Submitted<R>) -> Self {
        match submitted {
            Submitted::Created(record) => self.with_created(record),
            Submitted::Updated(record) => self.with_updated(record),
        }
    }

    /// Drop the record with `id`.
    pub fn without(mut self, id: Id) -> Self {
        self.items.retain(|r| r.id() != id);
        self
    }

    /// Delete `id` on the server and report the outcome. The snapshot
    /// returned on success no longer holds the record; `self` is untouched.
    pub fn delete<T: Transport>(
        &self,
        api: &Api<T>,
        id: Id,
        notifier: &mut Notifier,
    ) -> Result<Self, ApiError>
    where
        R: Deletable,
    {
        match api.service::<R>().delete(id) {
            Ok(()) => {
                tracing::info!(collection = R::COLLECTION, id, "deleted");
                notifier.show(R::DELETED, Severity::Success);
                Ok(self.clone().without(id))
            }
            Err(err) => {
                notifier.show(R::DELETE_FAILED, Severity::Error);
                Err(err)
            }
        }
    }
}

impl<'a, R> IntoIterator for &'a Collection<R> {
    type Item = &'a R;
    type IntoIter = std::slice::Iter<'a, R>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
