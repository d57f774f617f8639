//! Route table: builder and compiled lookup structure.
//!
//! # Responsibilities
//! - Accumulate (pattern, method, handler) registrations
//! - Reject duplicate (pattern, method) pairs at registration time
//! - Compile into an immutable table with metered handlers
//! - Resolve a request path and method to a handler or a miss
//!
//! # Design Decisions
//! - Routes are sorted by pattern string and scanned in that order
//! - Precedence is lexicographic, not by specificity
//! - An exact method registration wins over an `Any` one on the same pattern
//! - The compiled table is never mutated, so lookups need no locks

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Instant;

use http::Method;

use crate::http::handler::{BoxHandler, Handler, HandlerResult};
use crate::http::request::Request;
use crate::observability::metrics::{Meter, RouteMetrics};
use crate::routing::route::Route;
use crate::routing::RouteError;

/// Method a handler is registered for.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RouteMethod {
    /// Matches every request method.
    Any,
    Exact(Method),
}

impl From<Method> for RouteMethod {
    fn from(method: Method) -> Self {
        RouteMethod::Exact(method)
    }
}

impl fmt::Display for RouteMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RouteMethod::Any => f.write_str("ANY"),
            RouteMethod::Exact(method) => f.write_str(method.as_str()),
        }
    }
}

/// Collects routes before the server starts.
#[derive(Default)]
pub struct RouteBuilder {
    routes: HashMap<String, (Route, HashMap<RouteMethod, BoxHandler>)>,
}

impl RouteBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `pattern` and `method`.
    ///
    /// Fails if the pattern is empty or invalid, or if a handler already
    /// exists for the same pattern and method.
    pub fn add_route(
        &mut self,
        pattern: &str,
        handler: impl Handler,
        method: impl Into<RouteMethod>,
    ) -> Result<&mut Self, RouteError> {
        let method = method.into();
        let route = Route::build(pattern)?;

        let (_, handlers) = self
            .routes
            .entry(pattern.to_string())
            .or_insert_with(|| (route, HashMap::new()));

        if handlers.contains_key(&method) {
            return Err(RouteError::Duplicate {
                pattern: pattern.to_string(),
                method: method.to_string(),
            });
        }
        handlers.insert(method, Arc::new(handler));
        Ok(self)
    }

    pub fn get(&mut self, pattern: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(pattern, handler, Method::GET)
    }

    pub fn post(&mut self, pattern: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(pattern, handler, Method::POST)
    }

    pub fn put(&mut self, pattern: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(pattern, handler, Method::PUT)
    }

    pub fn delete(&mut self, pattern: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(pattern, handler, Method::DELETE)
    }

    pub fn head(&mut self, pattern: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(pattern, handler, Method::HEAD)
    }

    pub fn options(&mut self, pattern: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(pattern, handler, Method::OPTIONS)
    }

    pub fn patch(&mut self, pattern: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(pattern, handler, Method::PATCH)
    }

    pub fn trace(&mut self, pattern: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(pattern, handler, Method::TRACE)
    }

    pub fn connect(&mut self, pattern: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(pattern, handler, Method::CONNECT)
    }

    pub fn any(&mut self, pattern: &str, handler: impl Handler) -> Result<&mut Self, RouteError> {
        self.add_route(pattern, handler, RouteMethod::Any)
    }

    /// Number of registered (pattern, method) pairs.
    pub fn len(&self) -> usize {
        self.routes.values().map(|(_, handlers)| handlers.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Freeze the registrations into a sorted, metered table.
    pub fn compile(self) -> CompiledRoutes {
        let mut routes: Vec<CompiledRoute> = self
            .routes
            .into_values()
            .map(|(route, handlers)| {
                let handlers = handlers
                    .into_iter()
                    .map(|(method, handler)| {
                        let metered = MeteredHandler::new(&route, &method, handler);
                        (method, Arc::new(metered))
                    })
                    .collect();
                CompiledRoute { route, handlers }
            })
            .collect();
        routes.sort_by(|a, b| a.route.cmp(&b.route));

        tracing::debug!(routes = routes.len(), "Route table compiled");
        CompiledRoutes { routes }
    }
}

/// Handler wrapped with its per-(route, method) instrumentation.
pub struct MeteredHandler {
    pattern: String,
    method: RouteMethod,
    inner: BoxHandler,
    metrics: RouteMetrics,
}

impl MeteredHandler {
    fn new(route: &Route, method: &RouteMethod, inner: BoxHandler) -> Self {
        Self {
            pattern: route.pattern().to_string(),
            method: method.clone(),
            metrics: RouteMetrics::new(route.pattern(), &method.to_string()),
            inner,
        }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    pub fn method(&self) -> &RouteMethod {
        &self.method
    }

    /// Times this handler has been invoked.
    pub fn invocations(&self) -> &Meter {
        &self.metrics.invocations
    }
}

impl Handler for MeteredHandler {
    fn handle(&self, request: &Request) -> HandlerResult {
        self.metrics.invocations.mark();
        let started = Instant::now();
        let result = self.inner.handle(request);
        self.metrics.record_latency(started);
        result
    }
}

impl fmt::Debug for MeteredHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MeteredHandler")
            .field("pattern", &self.pattern)
            .field("method", &self.method)
            .finish()
    }
}

struct CompiledRoute {
    route: Route,
    handlers: HashMap<RouteMethod, Arc<MeteredHandler>>,
}

impl CompiledRoute {
    fn handler_for(&self, method: &Method) -> Option<&Arc<MeteredHandler>> {
        self.handlers
            .get(&RouteMethod::Exact(method.clone()))
            .or_else(|| self.handlers.get(&RouteMethod::Any))
    }
}

/// Outcome of a route lookup.
#[derive(Debug, Clone)]
pub enum Match {
    /// No pattern matched the path.
    NotFound,
    /// A pattern matched the path, but no handler is registered for the method.
    MethodNotAllowed,
    Matched {
        handler: Arc<MeteredHandler>,
        variables: HashMap<String, String>,
    },
}

impl PartialEq for Match {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Match::NotFound, Match::NotFound) => true,
            (Match::MethodNotAllowed, Match::MethodNotAllowed) => true,
            (
                Match::Matched { handler: a, variables: va },
                Match::Matched { handler: b, variables: vb },
            ) => Arc::ptr_eq(a, b) && va == vb,
            _ => false,
        }
    }
}

/// Immutable route table used at serving time.
pub struct CompiledRoutes {
    routes: Vec<CompiledRoute>,
}

impl CompiledRoutes {
    /// Resolve `path` (query already stripped) and `method`.
    pub fn match_request(&self, path: &str, method: &Method) -> Match {
        let mut path_matched = false;
        for compiled in &self.routes {
            let Some(variables) = compiled.route.groups(path) else {
                continue;
            };
            path_matched = true;
            if let Some(handler) = compiled.handler_for(method) {
                return Match::Matched {
                    handler: Arc::clone(handler),
                    variables,
                };
            }
        }

        if path_matched {
            Match::MethodNotAllowed
        } else {
            Match::NotFound
        }
    }

    /// Patterns in lookup order.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.routes.iter().map(|c| c.route.pattern())
    }

    pub fn len(&self) -> usize {
        self.routes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.routes.is_empty()
    }
}

impl fmt::Debug for CompiledRoutes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.patterns()).finish()
    }
}
