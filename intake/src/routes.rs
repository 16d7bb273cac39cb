//! Route table and the global navigation guard.
//!
//! SYSTEM CONTEXT
//! ==============
//! Every navigation resolves its destination against the [`RouteTable`],
//! then asks [`before_each`] whether to proceed. The guard is a pure
//! function of the destination and a [`TokenSnapshot`]; the [`Navigator`]
//! takes a fresh snapshot per hop and only mounts the route it finally
//! lands on. Denial is a silent redirect.

#[cfg(test)]
#[path = "routes_test.rs"]
mod routes_test;

use std::collections::BTreeMap;

use crate::session::{Role, Session, TokenSnapshot};

/// Redirect hops at which a navigation gives up.
pub const MAX_REDIRECTS: usize = 8;

// =============================================================================
// ROUTES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum View {
    PatientLogin,
    PatientMain,
    PatientIdentity,
    PatientMyPage,
    DepartmentSelection,
    PatientQuestionnaire,
    DoctorLogin,
    DoctorQueue,
    DoctorPatientDetail,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteMeta {
    pub requires_auth: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub name: &'static str,
    pub view: View,
    pub meta: RouteMeta,
}

const fn route(path: &'static str, name: &'static str, view: View, requires_auth: bool) -> RouteDescriptor {
    RouteDescriptor { path, name, view, meta: RouteMeta { requires_auth } }
}

#[must_use]
pub fn patient_routes() -> Vec<RouteDescriptor> {
    vec![
        route("/patient/login", "PatientLogin", View::PatientLogin, false),
        route("/patient/main", "PatientMain", View::PatientMain, true),
        route("/patient/identity", "PatientIdentity", View::PatientIdentity, true),
        route("/patient/my", "PatientMyPage", View::PatientMyPage, true),
        route("/patient/department-selection", "DepartmentSelection", View::DepartmentSelection, true),
        route("/patient/questionnaire/:deptId", "PatientQuestionnaire", View::PatientQuestionnaire, true),
    ]
}

#[must_use]
pub fn doctor_routes() -> Vec<RouteDescriptor> {
    vec![
        route("/doctor/login", "DoctorLogin", View::DoctorLogin, false),
        route("/doctor/queue", "DoctorQueue", View::DoctorQueue, true),
        route("/doctor/patient/:recordId", "DoctorPatientDetail", View::DoctorPatientDetail, true),
    ]
}

/// A resolved destination with its captured `:param` segments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteMatch<'a> {
    pub route: &'a RouteDescriptor,
    pub path: String,
    pub params: BTreeMap<String, String>,
}

/// Immutable path → view table. First matching descriptor wins.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTable {
    routes: Vec<RouteDescriptor>,
}

impl Default for RouteTable {
    fn default() -> Self {
        let mut routes = patient_routes();
        routes.extend(doctor_routes());
        Self::new(routes)
    }
}

impl RouteTable {
    #[must_use]
    pub fn new(routes: Vec<RouteDescriptor>) -> Self {
        Self { routes }
    }

    #[must_use]
    pub fn routes(&self) -> &[RouteDescriptor] {
        &self.routes
    }

    /// Match `path` against the table. Query and fragment are ignored and a
    /// trailing slash is tolerated.
    #[must_use]
    pub fn resolve(&self, path: &str) -> Option<RouteMatch<'_>> {
        let path = normalize(path);
        let segments: Vec<&str> = split(&path).collect();
        self.routes.iter().find_map(|route| {
            let params = match_template(route.path, &segments)?;
            Some(RouteMatch { route, path: path.clone(), params })
        })
    }
}

fn normalize(path: &str) -> String {
    let end = path.find(['?', '#']).unwrap_or(path.len());
    let trimmed = path[..end].trim_end_matches('/');
    if trimmed.is_empty() {
        "/".to_owned()
    } else if trimmed.starts_with('/') {
        trimmed.to_owned()
    } else {
        format!("/{trimmed}")
    }
}

fn split(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|segment| !segment.is_empty())
}

fn match_template(template: &str, segments: &[&str]) -> Option<BTreeMap<String, String>> {
    let pattern: Vec<&str> = split(template).collect();
    if pattern.len() != segments.len() {
        return None;
    }
    let mut params = BTreeMap::new();
    for (expected, actual) in pattern.iter().zip(segments) {
        if let Some(name) = expected.strip_prefix(':') {
            params.insert(name.to_owned(), (*actual).to_owned());
        } else if expected != actual {
            return None;
        }
    }
    Some(params)
}

// =============================================================================
// GUARD
// =============================================================================

/// Guarded path prefix a destination falls under.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Partition {
    Doctor,
    Patient,
    Public,
}

impl Partition {
    #[must_use]
    pub fn of(path: &str) -> Self {
        if path.starts_with(Role::Doctor.path_prefix()) {
            Self::Doctor
        } else if path.starts_with(Role::Patient.path_prefix()) {
            Self::Patient
        } else {
            Self::Public
        }
    }

    #[must_use]
    pub fn role(self) -> Option<Role> {
        match self {
            Self::Doctor => Some(Role::Doctor),
            Self::Patient => Some(Role::Patient),
            Self::Public => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardDecision {
    Proceed,
    Redirect(&'static str),
}

/// Decide whether a navigation to `path` may proceed.
///
/// Routes that require auth under `/doctor` or `/patient` redirect to that
/// partition's login when the matching token is absent.
#[must_use]
pub fn before_each(path: &str, meta: &RouteMeta, tokens: &TokenSnapshot) -> GuardDecision {
    let Some(role) = Partition::of(path).role() else {
        return GuardDecision::Proceed;
    };
    if meta.requires_auth && tokens.get(role).is_none() {
        GuardDecision::Redirect(role.login_path())
    } else {
        GuardDecision::Proceed
    }
}

// =============================================================================
// NAVIGATOR
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    /// `view` was mounted at `path` after `redirects` guard redirects.
    Mounted {
        path: String,
        view: View,
        params: BTreeMap<String, String>,
        redirects: usize,
    },
    /// Nothing matched; no view was mounted.
    NotFound { path: String },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NavigationError {
    #[error("navigation to {path} exceeded {hops} redirects")]
    TooManyRedirects { path: String, hops: usize },
}

/// Drives navigations through the guard against the live session.
#[derive(Debug, Clone)]
pub struct Navigator {
    table: RouteTable,
    session: Session,
}

impl Navigator {
    #[must_use]
    pub fn new(table: RouteTable, session: Session) -> Self {
        Self { table, session }
    }

    /// Navigate to `path`, calling `mount` once for the route finally allowed.
    ///
    /// # Errors
    ///
    /// Returns [`NavigationError::TooManyRedirects`] when the guard keeps
    /// redirecting past [`MAX_REDIRECTS`] hops.
    pub fn navigate<F>(&self, path: &str, mut mount: F) -> Result<Navigation, NavigationError>
    where
        F: FnMut(&RouteMatch<'_>),
    {
        let mut current = path.to_owned();
        for redirects in 0..=MAX_REDIRECTS {
            let Some(matched) = self.table.resolve(&current) else {
                tracing::debug!(path = %current, "no route matched");
                return Ok(Navigation::NotFound { path: normalize(&current) });
            };

            match before_each(&matched.path, &matched.route.meta, &self.session.snapshot()) {
                GuardDecision::Proceed => {
                    tracing::debug!(path = %matched.path, route = matched.route.name, redirects, "mounting route");
                    mount(&matched);
                    return Ok(Navigation::Mounted {
                        path: matched.path,
                        view: matched.route.view,
                        params: matched.params,
                        redirects,
                    });
                }
                GuardDecision::Redirect(target) => {
                    tracing::debug!(from = %matched.path, to = target, "guard redirected navigation");
                    current = target.to_owned();
                }
            }
        }

        tracing::warn!(path, hops = MAX_REDIRECTS, "navigation redirect loop");
        Err(NavigationError::TooManyRedirects { path: path.to_owned(), hops: MAX_REDIRECTS })
    }
}
