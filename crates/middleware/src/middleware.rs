//! The phase-indexed middleware algebra.
//!
//! A [`Middleware<I, O, L, A>`] describes one step of an exchange: starting in phase `I`
//! it reads or writes the connection, ends in phase `O` and yields either an `A` or
//! an `L`. Steps are combined with [`Middleware::and_then`], which only accepts a
//! continuation whose input phase is the output phase of the current step, so writing
//! a body before the status does not compile:
//!
//! ```compile_fail
//! use http::StatusCode;
//! use micro_middleware::response::{send, status};
//! use std::convert::Infallible;
//!
//! // status leaves the response in `HeadersOpen`, send needs `BodyOpen`
//! let m = status::<Infallible>(StatusCode::OK).and_then(|()| send("too early"));
//! ```
//!
//! Nothing happens while a middleware is built or evaluated. [`Middleware::eval`] binds
//! it to a connection and returns a [`Task`], only running the task performs the writes.

use futures::future::BoxFuture;
use micro_conn::Conn;
use std::any::type_name;
use std::fmt;
use std::future::{Future, IntoFuture};
use std::marker::PhantomData;
use tracing::{debug, trace};

use crate::phase::Phase;

type Run<L, A> = Box<dyn for<'c> FnOnce(&'c mut dyn Conn) -> BoxFuture<'c, Result<A, L>> + Send>;

/// A composable, possibly failing, asynchronous step over a connection that moves the
/// response from phase `I` to phase `O`.
#[must_use = "middleware does nothing unless evaluated and run"]
pub struct Middleware<I, O, L, A> {
    run: Run<L, A>,
    _phase: PhantomData<fn(I) -> O>,
}

impl<I, O, L, A> fmt::Debug for Middleware<I, O, L, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Middleware")
            .field("from", &type_name::<I>())
            .field("to", &type_name::<O>())
            .finish_non_exhaustive()
    }
}

impl<I, L, A> Middleware<I, I, L, A>
where
    I: Phase,
    L: Send + 'static,
    A: Send + 'static,
{
    /// Succeeds with `value` without touching the connection.
    pub fn of(value: A) -> Self {
        Self::from_fn(move |_conn| Box::pin(async move { Ok(value) }))
    }

    /// Fails with `error` without touching the connection.
    pub fn fail(error: L) -> Self {
        Self::from_fn(move |_conn| Box::pin(async move { Err(error) }))
    }

    pub fn from_result(result: Result<A, L>) -> Self {
        Self::from_fn(move |_conn| Box::pin(async move { result }))
    }

    /// Reads the connection.
    ///
    /// # Example
    /// ```
    /// use micro_conn::HttpConn;
    /// use micro_middleware::phase::StatusOpen;
    /// use micro_middleware::Middleware;
    /// use std::convert::Infallible;
    ///
    /// let m = Middleware::<StatusOpen, _, Infallible, _>::from_conn(|conn| Ok(conn.header("token")));
    ///
    /// let mut conn = HttpConn::builder().build().unwrap();
    /// let token = futures::executor::block_on(m.eval(&mut conn).run());
    /// assert_eq!(token, Ok(None));
    /// ```
    pub fn from_conn<F>(f: F) -> Self
    where
        F: FnOnce(&dyn Conn) -> Result<A, L> + Send + 'static,
    {
        Self::from_fn(move |conn| Box::pin(async move { f(&*conn) }))
    }

    /// Lifts an asynchronous computation that does not need the connection.
    pub fn from_future<Fut>(future: Fut) -> Self
    where
        Fut: Future<Output = Result<A, L>> + Send + 'static,
    {
        Self::from_fn(move |_conn| Box::pin(future))
    }
}

impl<I, O, L, A> Middleware<I, O, L, A>
where
    I: Phase,
    O: Phase,
    L: Send + 'static,
    A: Send + 'static,
{
    /// Builds a middleware from its raw effect.
    ///
    /// The closure is called once, when the middleware runs. All connection access must
    /// happen inside the returned future.
    pub fn from_fn<F>(f: F) -> Self
    where
        F: for<'c> FnOnce(&'c mut dyn Conn) -> BoxFuture<'c, Result<A, L>> + Send + 'static,
    {
        Self { run: Box::new(f), _phase: PhantomData }
    }

    /// Sequences `f` after this middleware, a.k.a. `ichain`.
    ///
    /// `f` is only called when this middleware succeeded. The first failure is returned
    /// as is and every later step is skipped, writes that already happened stay.
    #[doc(alias = "ichain")]
    #[doc(alias = "chain")]
    pub fn and_then<P, B, F>(self, f: F) -> Middleware<I, P, L, B>
    where
        P: Phase,
        B: Send + 'static,
        F: FnOnce(A) -> Middleware<O, P, L, B> + Send + 'static,
    {
        let run = self.run;
        Middleware::from_fn(move |conn| {
            Box::pin(async move {
                let a = run(&mut *conn).await?;
                (f(a).run)(conn).await
            })
        })
    }

    /// Sequences `next` after this middleware, dropping this middleware's value.
    pub fn and<P, B>(self, next: Middleware<O, P, L, B>) -> Middleware<I, P, L, B>
    where
        P: Phase,
        B: Send + 'static,
    {
        self.and_then(move |_| next)
    }

    /// Recovers from a failure by running the middleware `f` returns.
    ///
    /// The recovery starts from the same phase as this middleware. It is meant for steps
    /// that do not write, such as decoding, where the connection is left untouched on failure.
    pub fn or_else<M, F>(self, f: F) -> Middleware<I, O, M, A>
    where
        M: Send + 'static,
        F: FnOnce(L) -> Middleware<I, O, M, A> + Send + 'static,
    {
        let run = self.run;
        Middleware::from_fn(move |conn| {
            Box::pin(async move {
                match run(&mut *conn).await {
                    Ok(a) => Ok(a),
                    Err(l) => (f(l).run)(conn).await,
                }
            })
        })
    }

    pub fn map<B, F>(self, f: F) -> Middleware<I, O, L, B>
    where
        B: Send + 'static,
        F: FnOnce(A) -> B + Send + 'static,
    {
        let run = self.run;
        Middleware::from_fn(move |conn| Box::pin(async move { run(conn).await.map(f) }))
    }

    pub fn map_err<M, F>(self, f: F) -> Middleware<I, O, M, A>
    where
        M: Send + 'static,
        F: FnOnce(L) -> M + Send + 'static,
    {
        let run = self.run;
        Middleware::from_fn(move |conn| Box::pin(async move { run(conn).await.map_err(f) }))
    }

    /// Maps the error with `f` and the value with `g`.
    pub fn bimap<M, B, F, G>(self, f: F, g: G) -> Middleware<I, O, M, B>
    where
        M: Send + 'static,
        B: Send + 'static,
        F: FnOnce(L) -> M + Send + 'static,
        G: FnOnce(A) -> B + Send + 'static,
    {
        let run = self.run;
        Middleware::from_fn(move |conn| Box::pin(async move { run(conn).await.map(g).map_err(f) }))
    }

    /// Binds this middleware to `conn`.
    ///
    /// No effect is performed until the returned [`Task`] is run. The task resolves with
    /// the final value or error, the connection is not part of the result.
    pub fn eval(self, conn: &mut dyn Conn) -> Task<'_, Result<A, L>> {
        let run = self.run;
        Task::new(move || {
            Box::pin(async move {
                trace!(from = type_name::<I>(), to = type_name::<O>(), "running middleware");
                let result = run(conn).await;
                if result.is_err() {
                    debug!(error = type_name::<L>(), "middleware resolved with an error");
                }
                result
            })
        })
    }
}

impl<I, O, L, B, E> Middleware<I, O, L, Result<B, E>>
where
    I: Phase,
    O: Phase,
    L: From<E> + Send + 'static,
    B: Send + 'static,
    E: Send + 'static,
{
    /// Moves a failed inner result into the error channel.
    ///
    /// Decoders yield their validation as a value, `flatten` turns a failed validation
    /// into a failure of the middleware so the following steps are skipped.
    pub fn flatten(self) -> Middleware<I, O, L, B> {
        let run = self.run;
        Middleware::from_fn(move |conn| Box::pin(async move { run(conn).await?.map_err(L::from) }))
    }
}

/// A deferred computation, created by [`Middleware::eval`].
///
/// Building a task has no side effects. [`Task::run`], or awaiting the task, starts it.
#[must_use = "a task does nothing unless run"]
pub struct Task<'c, T> {
    thunk: Box<dyn FnOnce() -> BoxFuture<'c, T> + Send + 'c>,
}

impl<T> fmt::Debug for Task<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Task").field("output", &type_name::<T>()).finish_non_exhaustive()
    }
}

impl<'c, T> Task<'c, T> {
    pub fn new<F>(thunk: F) -> Self
    where
        F: FnOnce() -> BoxFuture<'c, T> + Send + 'c,
    {
        Self { thunk: Box::new(thunk) }
    }

    /// Starts the computation.
    pub fn run(self) -> BoxFuture<'c, T> {
        (self.thunk)()
    }
}

impl<'c, T> IntoFuture for Task<'c, T> {
    type Output = T;
    type IntoFuture = BoxFuture<'c, T>;

    fn into_future(self) -> Self::IntoFuture {
        self.run()
    }
}
