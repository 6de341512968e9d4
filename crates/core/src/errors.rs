use rust_decimal::Decimal;
use thiserror::Error;

use crate::domain::coefficient::CoefficientAxis;

/// Problems with user input. The calculation does not start.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("floor area is not specified")]
    MissingArea,
    #[error("floor area `{0}` is not a number")]
    InvalidArea(String),
    #[error("floor area must be greater than zero")]
    NonPositiveArea,
    #[error("floor area must not exceed {max} m²")]
    AreaTooLarge { max: Decimal },
    #[error("object type is not selected")]
    MissingObjectType,
    #[error("project stage is not selected (П / РД / П+РД)")]
    MissingStage,
    #[error("urgency is not selected")]
    MissingUrgency,
    #[error("no section selected for calculation")]
    NoSectionSelected,
    #[error("section `{key}` is selected more than once")]
    DuplicateSection { key: String },
    #[error("detail level is not selected for section: {title}")]
    MissingDetail { key: String, title: String },
    #[error("automation level is not selected for section: {title}")]
    MissingAutomation { key: String, title: String },
}

/// A label or key that does not exist in the static tables.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    #[error("unknown {axis} label `{label}`{}", section_suffix(.section))]
    UnknownLabel { axis: CoefficientAxis, label: String, section: Option<String> },
    #[error("unknown section `{key}`")]
    UnknownSection { key: String },
}

fn section_suffix(section: &Option<String>) -> String {
    section.as_deref().map(|key| format!(" for section `{key}`")).unwrap_or_default()
}

impl LookupError {
    pub fn unknown_label(axis: CoefficientAxis, label: &str) -> Self {
        Self::UnknownLabel { axis, label: label.to_string(), section: None }
    }

    pub fn in_section(self, key: &str) -> Self {
        match self {
            Self::UnknownLabel { axis, label, .. } => {
                Self::UnknownLabel { axis, label, section: Some(key.to_string()) }
            }
            other => other,
        }
    }
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DomainError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum ApplicationError {
    #[error(transparent)]
    Domain(#[from] DomainError),
    #[error("integration failure: {0}")]
    Integration(String),
    #[error("configuration failure: {0}")]
    Configuration(String),
}

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum InterfaceError {
    #[error("bad request: {message}")]
    BadRequest { message: String, correlation_id: String },
    #[error("service unavailable: {message}")]
    ServiceUnavailable { message: String, correlation_id: String },
    #[error("internal error: {message}")]
    Internal { message: String, correlation_id: String },
}

impl InterfaceError {
    pub fn user_message(&self) -> &'static str {
        match self {
            Self::BadRequest { .. } => {
                "The request could not be processed. Check inputs and try again."
            }
            Self::ServiceUnavailable { .. } => {
                "The service is temporarily unavailable. Please retry shortly."
            }
            Self::Internal { .. } => "An unexpected internal error occurred.",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest { message, .. }
            | Self::ServiceUnavailable { message, .. }
            | Self::Internal { message, .. } => message,
        }
    }

    pub fn correlation_id(&self) -> &str {
        match self {
            Self::BadRequest { correlation_id, .. }
            | Self::ServiceUnavailable { correlation_id, .. }
            | Self::Internal { correlation_id, .. } => correlation_id,
        }
    }
}

impl ApplicationError {
    pub fn into_interface(self, correlation_id: impl Into<String>) -> InterfaceError {
        let correlation_id = correlation_id.into();
        let mut mapped = InterfaceError::from(self);
        match &mut mapped {
            InterfaceError::BadRequest { correlation_id: id, .. }
            | InterfaceError::ServiceUnavailable { correlation_id: id, .. }
            | InterfaceError::Internal { correlation_id: id, .. } => *id = correlation_id,
        }
        mapped
    }
}

impl From<ApplicationError> for InterfaceError {
    fn from(value: ApplicationError) -> Self {
        match value {
            ApplicationError::Domain(DomainError::Validation(error)) => Self::BadRequest {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Domain(DomainError::Lookup(error)) => Self::Internal {
                message: error.to_string(),
                correlation_id: "unassigned".to_owned(),
            },
            ApplicationError::Integration(message) => {
                Self::ServiceUnavailable { message, correlation_id: "unassigned".to_owned() }
            }
            ApplicationError::Configuration(message) => {
                Self::Internal { message, correlation_id: "unassigned".to_owned() }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::domain::coefficient::CoefficientAxis;
    use crate::errors::{ApplicationError, DomainError, InterfaceError, LookupError, ValidationError};

    #[test]
    fn validation_error_maps_to_bad_request_interface_error() {
        let interface =
            ApplicationError::from(DomainError::from(ValidationError::NoSectionSelected))
                .into_interface("req-1");

        assert!(matches!(
            interface,
            InterfaceError::BadRequest {
                ref correlation_id,
                ..
            } if correlation_id == "req-1"
        ));
        assert_eq!(interface.message(), "no section selected for calculation");
        assert_eq!(
            interface.user_message(),
            "The request could not be processed. Check inputs and try again."
        );
    }

    #[test]
    fn lookup_error_maps_to_internal_and_keeps_axis() {
        let lookup = LookupError::unknown_label(CoefficientAxis::Detail, "Эскиз").in_section("ar");
        let interface =
            ApplicationError::from(DomainError::from(lookup)).into_interface("req-2");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.message(), "unknown detail label `Эскиз` for section `ar`");
        assert_eq!(interface.correlation_id(), "req-2");
    }

    #[test]
    fn integration_error_maps_to_service_unavailable() {
        let interface =
            ApplicationError::Integration("gemini timeout".to_owned()).into_interface("req-3");

        assert!(matches!(interface, InterfaceError::ServiceUnavailable { .. }));
        assert_eq!(
            interface.user_message(),
            "The service is temporarily unavailable. Please retry shortly."
        );
    }

    #[test]
    fn configuration_error_maps_to_internal() {
        let interface =
            ApplicationError::Configuration("negative margin".to_owned()).into_interface("req-4");

        assert!(matches!(interface, InterfaceError::Internal { .. }));
        assert_eq!(interface.user_message(), "An unexpected internal error occurred.");
    }

    #[test]
    fn missing_choice_messages_name_the_section() {
        let error = ValidationError::MissingAutomation {
            key: "aps".to_string(),
            title: "Автоматическая пожарная сигнализация".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "automation level is not selected for section: Автоматическая пожарная сигнализация"
        );
    }
}
