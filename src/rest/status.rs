//! Status helpers: one function per HTTP status code.
//!
//! Each helper sets the status of the reply and hands the payload on for
//! serialization. Error statuses (4xx and 5xx) wrap a bare scalar payload as
//! `{"error": payload}` so clients always receive a structured body.
//!
//! ```
//! use microhttp_rest::rest::status::{status_created, status_not_found};
//! use serde_json::json;
//!
//! let created = status_created(json!({"id": 3}));
//! assert_eq!(created.data, json!({"id": 3}));
//!
//! let missing = status_not_found("no such user");
//! assert_eq!(missing.data, json!({"error": "no such user"}));
//! ```

use serde_json::{Map, Value};

use crate::server::{Entity, StatusCode};

/// Build the entity for `status`, wrapping scalar payloads of error statuses.
pub fn send_status(status: StatusCode, payload: impl Into<Value>) -> Entity {
    let data = payload.into();
    let data = if status.is_error() && !matches!(data, Value::Object(_) | Value::Array(_)) {
        let mut wrapped = Map::new();
        wrapped.insert("error".to_string(), data);
        Value::Object(wrapped)
    } else {
        data
    };
    Entity::new(status, data)
}

/// Send `payload` as-is with an explicit status, `200 OK` when none is given.
pub fn send_entity(payload: impl Into<Value>, status: Option<StatusCode>) -> Entity {
    Entity::new(status.unwrap_or(StatusCode::Ok), payload)
}

/// A named status helper, for callers that pick the status at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusHelper {
    pub name: &'static str,
    pub status: StatusCode,
}

impl StatusHelper {
    pub fn call(&self, payload: impl Into<Value>) -> Entity {
        send_status(self.status, payload)
    }
}

macro_rules! status_helpers {
    ($($name:ident => $status:ident,)*) => {
        $(
            #[doc = concat!("Reply with `", stringify!($status), "`.")]
            pub fn $name(payload: impl Into<Value>) -> Entity {
                send_status(StatusCode::$status, payload)
            }
        )*

        /// Every generated helper, in status order. Aliases follow the canonical name.
        pub const STATUS_HELPERS: &[StatusHelper] = &[
            $(StatusHelper { name: stringify!($name), status: StatusCode::$status },)*
        ];
    };
}

status_helpers! {
    status_continue => Continue,
    status_switching_protocols => SwitchingProtocols,
    status_processing => Processing,
    status_ok => Ok,
    status_created => Created,
    status_accepted => Accepted,
    status_non_authoritative_information => NonAuthoritativeInformation,
    status_no_content => NoContent,
    status_reset_content => ResetContent,
    status_partial_content => PartialContent,
    status_multi_status => MultiStatus,
    status_multiple_choices => MultipleChoices,
    status_moved_permanently => MovedPermanently,
    status_found => Found,
    status_see_other => SeeOther,
    status_not_modified => NotModified,
    status_use_proxy => UseProxy,
    status_switch_proxy => SwitchProxy,
    status_temporary_redirect => TemporaryRedirect,
    status_bad_request => BadRequest,
    status_unauthorized => Unauthorized,
    status_payment_required => PaymentRequired,
    status_forbidden => Forbidden,
    status_not_found => NotFound,
    status_method_not_allowed => MethodNotAllowed,
    status_not_acceptable => NotAcceptable,
    status_proxy_authentication_required => ProxyAuthenticationRequired,
    status_request_timeout => RequestTimeout,
    status_conflict => Conflict,
    status_gone => Gone,
    status_length_required => LengthRequired,
    status_precondition_failed => PreconditionFailed,
    status_request_entity_too_large => RequestEntityTooLarge,
    status_request_uri_too_long => RequestUriTooLong,
    status_unsupported_media_type => UnsupportedMediaType,
    status_requested_range_not_satisfiable => RequestedRangeNotSatisfiable,
    status_expectation_failed => ExpectationFailed,
    status_i_m_a_teapot => ImATeapot,
    status_unprocessable_entity => UnprocessableEntity,
    status_locked => Locked,
    status_failed_dependency => FailedDependency,
    status_upgrade_required => UpgradeRequired,
    status_retry_with => RetryWith,
    status_internal_server_error => InternalServerError,
    status_error => InternalServerError,
    status_not_implemented => NotImplemented,
    status_bad_gateway => BadGateway,
    status_service_unavailable => ServiceUnavailable,
    status_gateway_timeout => GatewayTimeout,
    status_http_version_not_supported => HttpVersionNotSupported,
    status_variant_also_negotiates => VariantAlsoNegotiates,
    status_insufficient_storage => InsufficientStorage,
    status_bandwidth_limit_exceeded => BandwidthLimitExceeded,
    status_not_extended => NotExtended,
}

/// Find a helper by name, e.g. `"status_not_found"`.
pub fn status_helper(name: &str) -> Option<&'static StatusHelper> {
    STATUS_HELPERS.iter().find(|helper| helper.name == name)
}

/// Find the canonical helper for a numeric status code.
pub fn status_helper_for(code: u16) -> Option<&'static StatusHelper> {
    STATUS_HELPERS.iter().find(|helper| helper.status.as_u16() == code)
}
