//! Endpoint table
//!
//! OICP 2.3 exposes one REST path per operation with the operator or
//! provider id as a path segment. OICP 2.0 - 2.2 expose one SOAP path per
//! service; the operation is found by the root element of the body.

use crate::domain::version::OicpVersion;
use crate::messages::{OperationKind, Service};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Rest { kind: OperationKind, party: String },
    Soap(Service),
}

/// Resolve a request path for `version`. Operations the version does not
/// carry have no endpoint.
pub fn route(version: OicpVersion, path: &str) -> Option<Route> {
    let path = path.split('?').next().unwrap_or(path);
    let path = path.trim_end_matches('/');

    if version.is_rest() {
        return OperationKind::ALL
            .into_iter()
            .filter(|kind| kind.is_available(version))
            .find_map(|kind| match_template(kind.rest_path(), path).map(|party| Route::Rest { kind, party }));
    }

    Service::ALL
        .into_iter()
        .filter(|service| service.operations().any(|kind| kind.is_available(version)))
        .find(|service| service.soap_path(version) == path)
        .map(Route::Soap)
}

/// Match a path against a template with exactly one `{placeholder}`
/// segment and return that segment.
fn match_template(template: &str, path: &str) -> Option<String> {
    let mut template_segments = template.split('/');
    let mut path_segments = path.split('/');
    let mut party = None;

    loop {
        match (template_segments.next(), path_segments.next()) {
            (None, None) => return party,
            (Some(t), Some(p)) if t.starts_with('{') && t.ends_with('}') => {
                if p.is_empty() {
                    return None;
                }
                party = Some(p.to_string());
            }
            (Some(t), Some(p)) if t == p => {}
            _ => return None,
        }
    }
}

/// Every path served for `version`, e.g. for startup logging.
pub fn paths(version: OicpVersion) -> Vec<String> {
    if version.is_rest() {
        OperationKind::ALL
            .into_iter()
            .filter(|kind| kind.is_available(version))
            .map(|kind| kind.rest_path().to_string())
            .collect()
    } else {
        Service::ALL
            .into_iter()
            .filter(|service| service.operations().any(|kind| kind.is_available(version)))
            .map(|service| service.soap_path(version))
            .collect()
    }
}
