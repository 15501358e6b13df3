use std::any::Any;
use std::fmt;

use http::StatusCode;

/// A response deserialized into the type selected from its status code.
///
/// ```rust
/// # use restcast_core::DynResponse;
/// # #[derive(Debug, serde::Deserialize)] struct LoginOk { token: String }
/// # #[derive(Debug, serde::Deserialize)] struct LoginConflict { code: u32 }
/// fn describe(response: DynResponse) -> String {
///     if let Some(conflict) = response.downcast_ref::<LoginConflict>() {
///         return format!("conflict #{}", conflict.code);
///     }
///     match response.downcast::<LoginOk>() {
///         Ok(ok) => format!("logged in with {}", ok.token),
///         Err(other) => format!("unexpected {}", other.type_name()),
///     }
/// }
/// ```
pub struct DynResponse {
    status: StatusCode,
    type_name: &'static str,
    value: Box<dyn Any + Send>,
}

impl DynResponse {
    pub(in crate::client) fn new(
        status: StatusCode,
        type_name: &'static str,
        value: Box<dyn Any + Send>,
    ) -> Self {
        Self {
            status,
            type_name,
            value,
        }
    }

    /// The HTTP status code of the response.
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// The name of the resolved type.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Returns `true` if the value is a `T`.
    pub fn is<T: 'static>(&self) -> bool {
        self.value.is::<T>()
    }

    /// Borrows the value as a `T`.
    pub fn downcast_ref<T: 'static>(&self) -> Option<&T> {
        self.value.downcast_ref()
    }

    /// Takes the value as a `T`, or gives the response back.
    ///
    /// # Errors
    ///
    /// Returns `self` unchanged when the value is not a `T`.
    pub fn downcast<T: 'static>(self) -> Result<T, Self> {
        let Self {
            status,
            type_name,
            value,
        } = self;
        match value.downcast::<T>() {
            Ok(value) => Ok(*value),
            Err(value) => Err(Self {
                status,
                type_name,
                value,
            }),
        }
    }
}

impl fmt::Debug for DynResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DynResponse")
            .field("status", &self.status)
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}
