//! Test Doubles
//!
//! In-memory remote store, a hand-driven timer and a loopback HTTP server.

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};
use std::time::Duration;

use async_trait::async_trait;
use futures::channel::oneshot;

use crate::api::RemoteStore;
use crate::error::{ApiError, ApiResult};
use crate::models::{House, NewHouse};
use crate::notify::Timer;

pub fn house(id: u32, name: &str, address: &str, candy_in_stock: bool) -> House {
    House {
        id,
        name: name.to_string(),
        address: address.to_string(),
        candy_in_stock,
        allergen_free: "none".to_string(),
    }
}

pub fn server_error() -> ApiError {
    ApiError::Status { status: 500, reason: "Internal Server Error".to_string() }
}

// ========================
// Fake Remote Store
// ========================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Create(String),
    Patch(u32, bool),
}

#[derive(Default)]
struct FakeState {
    houses: Vec<House>,
    next_id: u32,
    calls: Vec<Call>,
    failing_patches: HashSet<u32>,
    fail_list: Option<ApiError>,
    fail_create: Option<ApiError>,
    held_patches: HashMap<u32, oneshot::Receiver<()>>,
    held_list: Option<oneshot::Receiver<()>>,
}

/// Server-side collection with failure injection.
///
/// Clones share state, so a test can keep a handle after giving one to the
/// controller.
#[derive(Clone, Default)]
pub struct FakeStore {
    state: Rc<RefCell<FakeState>>,
}

impl FakeStore {
    pub fn with_houses(houses: Vec<House>) -> Self {
        let next_id = houses.iter().map(|h| h.id).max().unwrap_or(0) + 1;
        let store = Self::default();
        {
            let mut state = store.state.borrow_mut();
            state.houses = houses;
            state.next_id = next_id;
        }
        store
    }

    pub fn houses(&self) -> Vec<House> {
        self.state.borrow().houses.clone()
    }

    pub fn set_houses(&self, houses: Vec<House>) {
        self.state.borrow_mut().houses = houses;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.borrow().calls.clone()
    }

    pub fn patch_calls(&self) -> usize {
        self.calls().iter().filter(|c| matches!(c, Call::Patch(..))).count()
    }

    pub fn fail_patch(&self, id: u32) {
        self.state.borrow_mut().failing_patches.insert(id);
    }

    pub fn fail_list(&self, error: ApiError) {
        self.state.borrow_mut().fail_list = Some(error);
    }

    pub fn fail_create(&self, error: ApiError) {
        self.state.borrow_mut().fail_create = Some(error);
    }

    /// Park the next patch for `id` until the returned sender fires
    pub fn hold_patch(&self, id: u32) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.borrow_mut().held_patches.insert(id, rx);
        tx
    }

    /// Park the next list until the returned sender fires.
    ///
    /// The response is read after release, so it reflects the server state at
    /// that moment.
    pub fn hold_list(&self) -> oneshot::Sender<()> {
        let (tx, rx) = oneshot::channel();
        self.state.borrow_mut().held_list = Some(rx);
        tx
    }
}

#[async_trait(?Send)]
impl RemoteStore for FakeStore {
    async fn list(&self) -> ApiResult<Vec<House>> {
        let held = {
            let mut state = self.state.borrow_mut();
            state.calls.push(Call::List);
            state.held_list.take()
        };
        if let Some(rx) = held {
            let _ = rx.await;
        }
        let state = self.state.borrow();
        match &state.fail_list {
            Some(error) => Err(error.clone()),
            None => Ok(state.houses.clone()),
        }
    }

    async fn create(&self, house: &NewHouse) -> ApiResult<()> {
        let mut state = self.state.borrow_mut();
        state.calls.push(Call::Create(house.name().to_string()));
        if let Some(error) = &state.fail_create {
            return Err(error.clone());
        }
        let id = state.next_id;
        state.next_id += 1;
        state.houses.push(House {
            id,
            name: house.name().to_string(),
            address: house.address().to_string(),
            candy_in_stock: true,
            allergen_free: house.allergen_free().to_string(),
        });
        Ok(())
    }

    async fn patch(&self, id: u32, candy_in_stock: bool) -> ApiResult<()> {
        let held = {
            let mut state = self.state.borrow_mut();
            state.calls.push(Call::Patch(id, candy_in_stock));
            state.held_patches.remove(&id)
        };
        if let Some(rx) = held {
            let _ = rx.await;
        }
        let mut state = self.state.borrow_mut();
        if state.failing_patches.contains(&id) {
            return Err(server_error());
        }
        match state.houses.iter_mut().find(|h| h.id == id) {
            Some(house) => {
                house.candy_in_stock = candy_in_stock;
                Ok(())
            }
            None => Err(ApiError::Status { status: 404, reason: "Not Found".to_string() }),
        }
    }
}

// ========================
// Manual Timer
// ========================

struct Scheduled {
    id: u64,
    due: Duration,
    callback: Box<dyn FnOnce()>,
}

#[derive(Default)]
struct Clock {
    now: Duration,
    next_id: u64,
    queue: Vec<Scheduled>,
}

/// Timer driven by `advance`; callbacks run in due order
#[derive(Clone, Default)]
pub struct ManualTimer {
    clock: Rc<RefCell<Clock>>,
}

pub struct ManualHandle {
    id: u64,
    clock: Weak<RefCell<Clock>>,
}

impl Drop for ManualHandle {
    fn drop(&mut self) {
        if let Some(clock) = self.clock.upgrade() {
            clock.borrow_mut().queue.retain(|s| s.id != self.id);
        }
    }
}

impl ManualTimer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Callbacks still waiting to fire
    pub fn scheduled(&self) -> usize {
        self.clock.borrow().queue.len()
    }

    pub fn advance(&self, by: Duration) {
        let target = self.clock.borrow().now + by;
        loop {
            let next = {
                let mut clock = self.clock.borrow_mut();
                let due = clock
                    .queue
                    .iter()
                    .enumerate()
                    .filter(|(_, s)| s.due <= target)
                    .min_by_key(|(_, s)| (s.due, s.id))
                    .map(|(index, _)| index);
                match due {
                    Some(index) => {
                        let scheduled = clock.queue.remove(index);
                        clock.now = scheduled.due;
                        Some(scheduled.callback)
                    }
                    None => {
                        clock.now = target;
                        None
                    }
                }
            };
            match next {
                Some(callback) => callback(),
                None => break,
            }
        }
    }
}

impl Timer for ManualTimer {
    type Handle = ManualHandle;

    fn schedule(&self, after: Duration, callback: Box<dyn FnOnce()>) -> ManualHandle {
        let mut clock = self.clock.borrow_mut();
        let id = clock.next_id;
        clock.next_id += 1;
        let due = clock.now + after;
        clock.queue.push(Scheduled { id, due, callback });
        ManualHandle { id, clock: Rc::downgrade(&self.clock) }
    }
}

// ========================
// Loopback HTTP Server
// ========================

#[cfg(not(target_arch = "wasm32"))]
pub use loopback::{LoopbackServer, Recorded, Reply};

#[cfg(not(target_arch = "wasm32"))]
mod loopback {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use tokio::io::{AsyncBufReadExt, AsyncReadExt, AsyncWriteExt, BufReader};
    use tokio::net::{TcpListener, TcpStream};

    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct Recorded {
        pub method: String,
        pub path: String,
        pub body: String,
    }

    #[derive(Debug, Clone)]
    pub struct Reply {
        status: u16,
        body: String,
        delay: Duration,
    }

    impl Reply {
        pub fn json(body: impl Into<String>) -> Self {
            Self { status: 200, body: body.into(), delay: Duration::ZERO }
        }

        pub fn status(status: u16) -> Self {
            Self { status, body: String::new(), delay: Duration::ZERO }
        }

        /// Hold the reply back after the request was handled
        pub fn after(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    type Handler = Arc<dyn Fn(&Recorded) -> Reply + Send + Sync>;
    type RequestLog = Arc<Mutex<Vec<Recorded>>>;

    /// One-request-per-connection HTTP/1.1 server on 127.0.0.1.
    ///
    /// The handler runs as soon as a request arrives, so a delayed reply still
    /// carries the state from arrival time.
    pub struct LoopbackServer {
        base_url: String,
        requests: RequestLog,
    }

    impl LoopbackServer {
        pub async fn start(handler: impl Fn(&Recorded) -> Reply + Send + Sync + 'static) -> Self {
            let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind loopback");
            let base_url = format!("http://{}/houses", listener.local_addr().expect("local addr"));
            let requests: RequestLog = Arc::default();

            let handler: Handler = Arc::new(handler);
            let log = requests.clone();
            tokio::spawn(async move {
                while let Ok((stream, _)) = listener.accept().await {
                    tokio::spawn(serve(stream, handler.clone(), log.clone()));
                }
            });
            Self { base_url, requests }
        }

        /// Collection URL, `http://127.0.0.1:<port>/houses`
        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        pub fn requests(&self) -> Vec<Recorded> {
            self.requests.lock().unwrap().clone()
        }
    }

    async fn serve(stream: TcpStream, handler: Handler, log: RequestLog) {
        let mut reader = BufReader::new(stream);
        let mut request_line = String::new();
        if reader.read_line(&mut request_line).await.unwrap_or(0) == 0 {
            return;
        }
        let mut parts = request_line.split_whitespace();
        let method = parts.next().unwrap_or_default().to_string();
        let path = parts.next().unwrap_or_default().to_string();

        let mut content_length = 0;
        loop {
            let mut line = String::new();
            if reader.read_line(&mut line).await.unwrap_or(0) == 0 {
                return;
            }
            let line = line.trim_end();
            if line.is_empty() {
                break;
            }
            if let Some((name, value)) = line.split_once(':') {
                if name.eq_ignore_ascii_case("content-length") {
                    content_length = value.trim().parse().unwrap_or(0);
                }
            }
        }
        let mut body = vec![0; content_length];
        if reader.read_exact(&mut body).await.is_err() {
            return;
        }

        let recorded = Recorded { method, path, body: String::from_utf8_lossy(&body).into_owned() };
        let reply = handler(&recorded);
        log.lock().unwrap().push(recorded);

        tokio::time::sleep(reply.delay).await;
        let response = format!(
            "HTTP/1.1 {} Reply\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            reply.status,
            reply.body.len(),
            reply.body
        );
        let mut stream = reader.into_inner();
        // The client may have given up already
        let _ = stream.write_all(response.as_bytes()).await;
        let _ = stream.shutdown().await;
    }
}
