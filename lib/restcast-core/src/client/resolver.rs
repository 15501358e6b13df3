use http::StatusCode;

use super::metadata::{RequestMetadata, ResponseType};

/// How a response type was selected for a status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// The status code has its own declared type.
    Status(&'a ResponseType),
    /// No status-specific type, fell back to the default response type.
    Default(&'a ResponseType),
}

impl<'a> Resolution<'a> {
    /// The selected response type.
    pub fn response_type(&self) -> &'a ResponseType {
        match self {
            Self::Status(response_type) | Self::Default(response_type) => response_type,
        }
    }

    /// Returns `true` if the response type came from the default.
    pub fn is_default(&self) -> bool {
        matches!(self, Self::Default(_))
    }

    /// Checks that a typed call asking for `T` may use this resolution.
    ///
    /// A status-specific type is trusted as is, the body is deserialized into `T` directly.
    /// A default type must be `T` itself.
    pub(in crate::client) fn accepts<T: 'static>(&self) -> Result<(), &'a ResponseType> {
        match self {
            Self::Default(declared) if !declared.is::<T>() => Err(declared),
            _ => Ok(()),
        }
    }
}

impl RequestMetadata {
    /// Selects the response type for `status`.
    ///
    /// A status-specific declaration wins over the default response type. Returns `None` when
    /// neither exists.
    pub fn resolve(&self, status: StatusCode) -> Option<Resolution<'_>> {
        if let Some(response_type) = self.status_response(status) {
            return Some(Resolution::Status(response_type));
        }
        self.default_response().map(Resolution::Default)
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct LoginOk {
        #[allow(dead_code)]
        token: String,
    }

    #[derive(Debug, Deserialize)]
    struct LoginConflict {
        #[allow(dead_code)]
        code: u32,
    }

    #[derive(Debug, Deserialize)]
    struct ApiError {
        #[allow(dead_code)]
        message: String,
    }

    fn login() -> RequestMetadata {
        RequestMetadata::post("/users/login")
            .on_status::<LoginOk>(StatusCode::OK)
            .on_status::<LoginConflict>(StatusCode::CONFLICT)
    }

    #[test]
    fn status_mapping_wins_over_default() {
        let metadata = login().with_default_response::<ApiError>();

        let resolution = metadata.resolve(StatusCode::CONFLICT).expect("resolved");

        assert!(!resolution.is_default());
        assert!(resolution.response_type().is::<LoginConflict>());
    }

    #[test]
    fn unmapped_status_falls_back_to_default() {
        let metadata = login().with_default_response::<ApiError>();

        let resolution = metadata
            .resolve(StatusCode::INTERNAL_SERVER_ERROR)
            .expect("resolved");

        assert_eq!(
            resolution,
            Resolution::Default(&ResponseType::of::<ApiError>())
        );
    }

    #[test]
    fn no_mapping_and_no_default_is_unresolved() {
        let metadata = login();

        assert!(metadata.resolve(StatusCode::NOT_FOUND).is_none());
    }

    #[test]
    fn typed_calls_check_only_the_default_type() {
        let metadata = login().with_default_response::<ApiError>();

        let on_status = metadata.resolve(StatusCode::OK).expect("resolved");
        assert!(on_status.accepts::<ApiError>().is_ok());

        let on_default = metadata.resolve(StatusCode::BAD_GATEWAY).expect("resolved");
        assert!(on_default.accepts::<ApiError>().is_ok());

        let declared = on_default.accepts::<LoginOk>().expect_err("incompatible");
        assert!(declared.is::<ApiError>());
    }
}
