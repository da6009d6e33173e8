use crate::error::{Error, ErrorKind};
use crate::{Event, EventHandler, Request, RequestHandler};
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, PoisonError, RwLock};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type BoxAny = Box<dyn Any + Send>;

type SharedHandlers<K, H> = Arc<RwLock<HashMap<K, H>>>;

// Requests are routed by request and response type together, a request type
// may answer with more than one response type.
#[derive(Debug, Clone, Copy, Hash, Eq, PartialEq)]
struct HandlerKey {
    req_ty: TypeId,
    res_ty: TypeId,
}

impl HandlerKey {
    fn of<Req: 'static, Res: 'static>() -> Self {
        HandlerKey {
            req_ty: TypeId::of::<Req>(),
            res_ty: TypeId::of::<Res>(),
        }
    }
}

// A wrapper around the request handler to handle the request and return the result.
// To provide type safety without unsafe code we box all: the function, the params and the result.
#[derive(Clone)]
struct RequestHandlerWrapper {
    #[allow(clippy::type_complexity)]
    handler: Arc<dyn Fn(BoxAny) -> BoxFuture<'static, crate::Result<BoxAny>> + Send + Sync>,
}

impl RequestHandlerWrapper {
    fn new<Req, Res, H>(handler: H) -> Self
    where
        Res: Send + 'static,
        Req: Request<Res> + Send + 'static,
        H: RequestHandler<Req, Res> + 'static,
    {
        let handler = Arc::new(handler);

        let f = move |req: BoxAny| -> BoxFuture<'static, crate::Result<BoxAny>> {
            let handler = handler.clone();

            Box::pin(async move {
                let req = downcast::<Req>(req)?;
                let res = handler.handle(req).await?;
                Ok(Box::new(res) as BoxAny)
            })
        };

        RequestHandlerWrapper {
            handler: Arc::new(f),
        }
    }

    fn from_fn<Req, Res, H, F>(handler: H) -> Self
    where
        Res: Send + 'static,
        Req: Request<Res> + Send + 'static,
        F: Future<Output = crate::Result<Res>> + Send + 'static,
        H: Fn(Req) -> F + Send + Sync + 'static,
    {
        let f = move |req: BoxAny| -> BoxFuture<'static, crate::Result<BoxAny>> {
            let req = downcast::<Req>(req);
            let res = req.map(&handler);

            Box::pin(async move {
                let res = res?.await?;
                Ok(Box::new(res) as BoxAny)
            })
        };

        RequestHandlerWrapper {
            handler: Arc::new(f),
        }
    }

    async fn handle<Req, Res>(&self, req: Req) -> crate::Result<Res>
    where
        Res: Send + 'static,
        Req: Request<Res> + Send + 'static,
    {
        let res = (self.handler)(Box::new(req)).await?;
        downcast::<Res>(res)
    }
}

// A wrapper around the event handler, boxed the same way as the request handlers.
#[derive(Clone)]
struct EventHandlerWrapper {
    #[allow(clippy::type_complexity)]
    handler: Arc<dyn Fn(BoxAny) -> BoxFuture<'static, ()> + Send + Sync>,
}

impl EventHandlerWrapper {
    fn new<E, H>(handler: H) -> Self
    where
        E: Event,
        H: EventHandler<E> + 'static,
    {
        let handler = Arc::new(handler);

        let f = move |event: BoxAny| -> BoxFuture<'static, ()> {
            let handler = handler.clone();

            Box::pin(async move {
                match downcast::<E>(event) {
                    Ok(event) => handler.handle(event).await,
                    Err(err) => log::error!("Dropped event: {}", err),
                }
            })
        };

        EventHandlerWrapper {
            handler: Arc::new(f),
        }
    }

    fn from_fn<E, H, F>(handler: H) -> Self
    where
        E: Event,
        H: Fn(E) -> F + Send + Sync + 'static,
        F: Future<Output = ()> + Send + 'static,
    {
        let f = move |event: BoxAny| -> BoxFuture<'static, ()> {
            match downcast::<E>(event) {
                Ok(event) => Box::pin(handler(event)),
                Err(err) => {
                    log::error!("Dropped event: {}", err);
                    Box::pin(async {})
                }
            }
        };

        EventHandlerWrapper {
            handler: Arc::new(f),
        }
    }

    async fn handle<E: Event>(&self, event: E) {
        (self.handler)(Box::new(event)).await
    }
}

fn downcast<T: 'static>(value: BoxAny) -> crate::Result<T> {
    value.downcast::<T>().map(|value| *value).map_err(|_| {
        Error::new(
            ErrorKind::HandlerNotFound,
            format!("unexpected value, expected `{}`", std::any::type_name::<T>()),
        )
    })
}

/// A central hub routing requests to their handler and events to their
/// subscribers.
///
/// Cloning a [Mediator] is cheap, every clone shares the same handlers.
#[derive(Clone, Default)]
pub struct Mediator {
    request_handlers: SharedHandlers<HandlerKey, RequestHandlerWrapper>,
    event_handlers: SharedHandlers<TypeId, Vec<EventHandlerWrapper>>,
}

impl Mediator {
    /// Gets a [Mediator] builder.
    pub fn builder() -> Builder {
        Builder::new()
    }

    /// Sends a request to its handler and waits for the response.
    pub async fn send<Req, Res>(&self, req: Req) -> crate::Result<Res>
    where
        Res: Send + 'static,
        Req: Request<Res> + Send + 'static,
    {
        let handler = self
            .request_handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&HandlerKey::of::<Req, Res>())
            .cloned();

        match handler {
            Some(handler) => handler.handle(req).await,
            None => Err(Error::new(
                ErrorKind::HandlerNotFound,
                std::any::type_name::<Req>(),
            )),
        }
    }

    /// Publish an event to every subscriber, in subscription order.
    pub async fn publish<E: Event>(&self, event: E) -> crate::Result<()> {
        let handlers = self
            .event_handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&TypeId::of::<E>())
            .cloned()
            .unwrap_or_default();

        for handler in handlers {
            handler.handle(event.clone()).await;
        }

        Ok(())
    }

    /// Whether a handler answers `Req` with `Res`.
    pub fn has_handler<Req, Res>(&self) -> bool
    where
        Res: 'static,
        Req: Request<Res> + 'static,
    {
        self.request_handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&HandlerKey::of::<Req, Res>())
    }

    fn insert_handler(&self, key: HandlerKey, handler: RequestHandlerWrapper) {
        self.request_handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, handler);
    }

    fn insert_subscriber(&self, key: TypeId, handler: EventHandlerWrapper) {
        self.event_handlers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(key)
            .or_default()
            .push(handler);
    }
}

impl fmt::Debug for Mediator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let requests = self
            .request_handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len();
        let events = self
            .event_handlers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(Vec::len)
            .sum::<usize>();

        f.debug_struct("Mediator")
            .field("request_handlers", &requests)
            .field("event_handlers", &events)
            .finish()
    }
}

/// A builder for the [Mediator].
pub struct Builder {
    inner: Mediator,
}

impl Builder {
    /// Constructs a new `Builder`.
    pub fn new() -> Self {
        Self {
            inner: Mediator::default(),
        }
    }

    /// Registers a request handler, replacing any previous handler for the
    /// same request and response.
    pub fn add_handler<Req, Res, H>(self, handler: H) -> Self
    where
        Req: Request<Res> + Send + 'static,
        Res: Send + 'static,
        H: RequestHandler<Req, Res> + 'static,
    {
        self.inner.insert_handler(
            HandlerKey::of::<Req, Res>(),
            RequestHandlerWrapper::new(handler),
        );
        self
    }

    /// Registers a request handler from a function.
    pub fn add_handler_fn<Req, Res, H, F>(self, handler: H) -> Self
    where
        Res: Send + 'static,
        Req: Request<Res> + Send + 'static,
        F: Future<Output = crate::Result<Res>> + Send + 'static,
        H: Fn(Req) -> F + Send + Sync + 'static,
    {
        self.inner.insert_handler(
            HandlerKey::of::<Req, Res>(),
            RequestHandlerWrapper::from_fn(handler),
        );
        self
    }

    /// Register a request handler using a copy of the mediator.
    pub fn add_handler_deferred<Req, Res, H, F>(self, f: F) -> Self
    where
        Req: Request<Res> + Send + 'static,
        Res: Send + 'static,
        H: RequestHandler<Req, Res> + 'static,
        F: FnOnce(Mediator) -> H,
    {
        let handler = f(self.inner.clone());
        self.add_handler(handler)
    }

    /// Registers an event handler.
    pub fn subscribe<E, H>(self, handler: H) -> Self
    where
        E: Event,
        H: EventHandler<E> + 'static,
    {
        self.inner
            .insert_subscriber(TypeId::of::<E>(), EventHandlerWrapper::new(handler));
        self
    }

    /// Registers an event handler from a function.
    pub fn subscribe_fn<E, H, F>(self, handler: H) -> Self
    where
        E: Event,
        F: Future<Output = ()> + Send + 'static,
        H: Fn(E) -> F + Send + Sync + 'static,
    {
        self.inner
            .insert_subscriber(TypeId::of::<E>(), EventHandlerWrapper::from_fn(handler));
        self
    }

    /// Builds the [Mediator].
    pub fn build(self) -> Mediator {
        self.inner
    }
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
fn _dummy() {
    fn assert_send_sync<T: Send + Sync>(_: T) {}
    assert_send_sync(Mediator::builder().build());
}
