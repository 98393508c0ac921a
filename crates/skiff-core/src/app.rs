//! The registration API: [`App`] and [`Group`].
//!
//! Registration happens during a single-threaded startup phase; `build`
//! (or `listen`, which calls it) freezes everything into an immutable
//! [`Engine`]. Route templates are programmer-supplied, so a malformed
//! template is a bug and panics at registration with the template named.

use std::path::PathBuf;
use std::sync::Arc;

use http::Method;

use skiff_router::RouteTable;

use crate::config::Config;
use crate::context::Ctx;
use crate::dispatch::{Engine, GroupMiddleware};
use crate::handler::{BoxHandler, Endpoint, ErrorHandler, IntoRouteChain, Middleware};

/// Mutable application builder.
///
/// # Example
///
/// ```ignore
/// use skiff_core::{App, Ctx, StatusCode};
///
/// let mut app = App::new();
/// app.get("/hey", |ctx: Ctx| async move { ctx.send(StatusCode::OK, "hey") });
///
/// let mut auth = app.group("/auth");
/// auth.get("/:name", |ctx: Ctx| async move {
///     ctx.send(StatusCode::OK, ctx.param("name"))
/// });
///
/// app.listen("127.0.0.1:3000").await?;
/// ```
pub struct App {
    config: Config,
    middleware: Vec<BoxHandler>,
    groups: Vec<GroupMiddleware>,
    table: RouteTable<BoxHandler>,
    not_found: Option<Box<dyn Endpoint>>,
    error_handler: Option<Box<dyn ErrorHandler>>,
}

impl App {
    /// Creates an app with the default [`Config`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates an app with an explicit configuration.
    #[must_use]
    pub fn with_config(config: Config) -> Self {
        Self {
            config,
            middleware: Vec::new(),
            groups: Vec::new(),
            table: RouteTable::new(),
            not_found: None,
            error_handler: None,
        }
    }

    /// Registers a route under an arbitrary method.
    ///
    /// `chain` is a terminal handler or an `(endpoint, mw, ...)` tuple;
    /// the tuple executes last-element-first with the endpoint last.
    pub fn route<C, M>(&mut self, method: Method, path: &str, chain: C)
    where
        C: IntoRouteChain<M>,
    {
        self.register(method, path, chain.into_chain());
    }

    fn register(&mut self, method: Method, path: &str, handlers: Vec<BoxHandler>) {
        if let Err(err) = self.table.register(method, path, handlers) {
            panic!("invalid route template `{path}`: {err}");
        }
    }

    /// Registers a GET route.
    pub fn get<C, M>(&mut self, path: &str, chain: C)
    where
        C: IntoRouteChain<M>,
    {
        self.route(Method::GET, path, chain);
    }

    /// Registers a POST route.
    pub fn post<C, M>(&mut self, path: &str, chain: C)
    where
        C: IntoRouteChain<M>,
    {
        self.route(Method::POST, path, chain);
    }

    /// Registers a PUT route.
    pub fn put<C, M>(&mut self, path: &str, chain: C)
    where
        C: IntoRouteChain<M>,
    {
        self.route(Method::PUT, path, chain);
    }

    /// Registers a DELETE route.
    pub fn delete<C, M>(&mut self, path: &str, chain: C)
    where
        C: IntoRouteChain<M>,
    {
        self.route(Method::DELETE, path, chain);
    }

    /// Registers a PATCH route.
    pub fn patch<C, M>(&mut self, path: &str, chain: C)
    where
        C: IntoRouteChain<M>,
    {
        self.route(Method::PATCH, path, chain);
    }

    /// Registers a HEAD route.
    pub fn head<C, M>(&mut self, path: &str, chain: C)
    where
        C: IntoRouteChain<M>,
    {
        self.route(Method::HEAD, path, chain);
    }

    /// Registers an OPTIONS route.
    pub fn options<C, M>(&mut self, path: &str, chain: C)
    where
        C: IntoRouteChain<M>,
    {
        self.route(Method::OPTIONS, path, chain);
    }

    /// Appends application-scope middleware, run for every request in
    /// registration order before route resolution.
    pub fn middleware<M: Middleware>(&mut self, middleware: M) {
        self.middleware.push(BoxHandler::middleware(middleware));
    }

    /// Opens a route group. Routes and middleware registered through it
    /// carry the prefix; groups nest.
    pub fn group(&mut self, prefix: impl Into<String>) -> Group<'_> {
        Group {
            prefix: prefix.into(),
            app: self,
        }
    }

    /// Replaces the not-found handler invoked on route-table misses.
    pub fn not_found<E: Endpoint>(&mut self, endpoint: E) {
        self.not_found = Some(Box::new(endpoint));
    }

    /// Replaces the error handler invoked when a chain aborts with an
    /// error.
    pub fn on_error<H: ErrorHandler>(&mut self, handler: H) {
        self.error_handler = Some(Box::new(handler));
    }

    /// Serves one file at `path` via a GET route.
    pub fn serve_file(&mut self, path: &str, file: impl Into<PathBuf>) {
        let file = file.into();
        self.get(path, move |ctx: Ctx| {
            let file = file.clone();
            async move { ctx.send_file(file).await }
        });
    }

    /// Serves every file under `dir`, rooted at `path`, with
    /// `<dir>/index.html` doubling as the mount root.
    ///
    /// The directory is walked once, at registration; files added later
    /// are not picked up. Panics when the directory cannot be read.
    pub fn serve_dir(&mut self, path: &str, dir: impl Into<PathBuf>) {
        let dir = dir.into();
        let files = skiff_http::fs::collect_paths(&dir).unwrap_or_else(|err| {
            panic!("cannot read static directory `{}`: {err}", dir.display())
        });
        let mount = path.trim_end_matches('/').to_string();
        let root = if mount.is_empty() { "/" } else { mount.as_str() };
        self.serve_file(root, dir.join("index.html"));
        for file in files {
            let Ok(relative) = file.strip_prefix(&dir) else {
                continue;
            };
            let mut route = mount.clone();
            for component in relative.components() {
                route.push('/');
                route.push_str(&component.as_os_str().to_string_lossy());
            }
            self.serve_file(&route, file);
        }
    }

    /// Freezes the registries into an immutable [`Engine`].
    #[must_use]
    pub fn build(self) -> Engine {
        Engine::new(
            self.config,
            self.middleware,
            self.groups,
            self.table,
            self.not_found,
            self.error_handler,
        )
    }

    /// Builds the engine and serves it on `addr` until ctrl-c.
    pub async fn listen(self, addr: impl tokio::net::ToSocketAddrs) -> std::io::Result<()> {
        crate::server::serve(Arc::new(self.build()), addr).await
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// A route group: a path prefix plus group-scoped middleware.
///
/// A group is purely a registration-time builder. At request time its only
/// trace is the middleware list stored under its literal prefix; every
/// registered prefix contained in the request path fires, in group
/// registration order.
pub struct Group<'a> {
    prefix: String,
    app: &'a mut App,
}

impl Group<'_> {
    /// The full prefix of this group, including any parents'.
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Registers a route under an arbitrary method, with the group prefix
    /// prepended.
    pub fn route<C, M>(&mut self, method: Method, path: &str, chain: C)
    where
        C: IntoRouteChain<M>,
    {
        let full = format!("{}{}", self.prefix, path);
        self.app.register(method, &full, chain.into_chain());
    }

    /// Registers a GET route under the group prefix.
    pub fn get<C, M>(&mut self, path: &str, chain: C)
    where
        C: IntoRouteChain<M>,
    {
        self.route(Method::GET, path, chain);
    }

    /// Registers a POST route under the group prefix.
    pub fn post<C, M>(&mut self, path: &str, chain: C)
    where
        C: IntoRouteChain<M>,
    {
        self.route(Method::POST, path, chain);
    }

    /// Registers a PUT route under the group prefix.
    pub fn put<C, M>(&mut self, path: &str, chain: C)
    where
        C: IntoRouteChain<M>,
    {
        self.route(Method::PUT, path, chain);
    }

    /// Registers a DELETE route under the group prefix.
    pub fn delete<C, M>(&mut self, path: &str, chain: C)
    where
        C: IntoRouteChain<M>,
    {
        self.route(Method::DELETE, path, chain);
    }

    /// Appends middleware scoped to this group's prefix.
    pub fn middleware<M: Middleware>(&mut self, middleware: M) {
        let handler = BoxHandler::middleware(middleware);
        match self
            .app
            .groups
            .iter_mut()
            .find(|group| group.prefix == self.prefix)
        {
            Some(group) => group.handlers.push(handler),
            None => self.app.groups.push(GroupMiddleware {
                prefix: self.prefix.clone(),
                handlers: vec![handler],
            }),
        }
    }

    /// Opens a nested group; prefixes concatenate.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        Group {
            prefix: format!("{}{}", self.prefix, prefix),
            app: &mut *self.app,
        }
    }
}
