//! End-to-end tests: a real server on a loopback port, replica servers
//! simulated by heartbeat loops.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::task::JoinHandle;
use viewservice::ServiceConfig;
use viewservice_client::{Client, ClientConfig, Heartbeat};
use viewservice_server::{Server, ServerConfig, ServerResult, ShutdownHandle};
use viewservice_types::{ServerId, View, ViewNumber};

const PING_INTERVAL: Duration = Duration::from_millis(20);
const DEAD_PINGS: u32 = 5;
const WAIT_LIMIT: Duration = Duration::from_secs(5);

// ============================================================================
// Helper Functions
// ============================================================================

struct TestService {
    addr: SocketAddr,
    shutdown: ShutdownHandle,
    task: JoinHandle<ServerResult<()>>,
}

impl TestService {
    async fn start() -> Self {
        let config = ServerConfig::new("127.0.0.1:0".parse().unwrap())
            .with_service(ServiceConfig::new(PING_INTERVAL, DEAD_PINGS));
        let server = Server::bind(config).await.unwrap();
        let addr = server.local_addr().unwrap();
        let shutdown = server.shutdown_handle();
        let task = tokio::spawn(server.run());
        Self {
            addr,
            shutdown,
            task,
        }
    }

    fn client(&self) -> Client {
        Client::new(self.addr.to_string(), ClientConfig::default())
    }

    fn heartbeat(&self, name: &str) -> Heartbeat {
        Heartbeat::spawn(self.client(), id(name), PING_INTERVAL)
    }

    /// Polls `Get` until `done` holds for the view.
    async fn wait_for_view(&self, done: impl Fn(&View) -> bool) -> View {
        let mut client = self.client();
        let deadline = tokio::time::Instant::now() + WAIT_LIMIT;
        loop {
            if let Ok(view) = client.get().await {
                if done(&view) {
                    return view;
                }
                if tokio::time::Instant::now() > deadline {
                    panic!("view never reached the expected state, last: {view}");
                }
            }
            tokio::time::sleep(PING_INTERVAL / 2).await;
        }
    }

    async fn wait_for_exact(&self, n: u64, primary: Option<&str>, backup: Option<&str>) {
        let expected = View::new(ViewNumber::new(n), primary.map(id), backup.map(id));
        self.wait_for_view(|v| *v == expected).await;
    }

    async fn stop(self) {
        self.shutdown.shutdown();
        self.task.await.unwrap().unwrap();
    }
}

fn id(s: &str) -> ServerId {
    ServerId::parse(s).unwrap()
}

/// Waits until `hb` has been told about view `n`, then a few more intervals
/// so that its next pings (reporting `n`) have landed.
async fn caught_up(hb: &Heartbeat, n: u64) {
    let mut rx = hb.subscribe();
    tokio::time::timeout(WAIT_LIMIT, rx.wait_for(|v| v.viewnum == ViewNumber::new(n)))
        .await
        .expect("heartbeat never saw the view")
        .unwrap();
    tokio::time::sleep(PING_INTERVAL * 3).await;
}

// ============================================================================
// Bootstrap
// ============================================================================

#[tokio::test]
async fn bootstrap_reply_precedes_view_one() {
    let service = TestService::start().await;
    let mut client = service.client();

    let reply = client.ping(&id("s1"), ViewNumber::ZERO).await.unwrap();
    assert_eq!(reply, View::new(ViewNumber::ZERO, Some(id("s1")), None));

    let current = client.get().await.unwrap();
    assert_eq!(current, View::new(ViewNumber::new(1), Some(id("s1")), None));

    service.stop().await;
}

#[tokio::test]
async fn first_primary() {
    let service = TestService::start().await;
    let _s1 = service.heartbeat("s1");

    service.wait_for_exact(1, Some("s1"), None).await;
    assert_eq!(service.client().primary().await, Some(id("s1")));

    service.stop().await;
}

#[tokio::test]
async fn first_backup() {
    let service = TestService::start().await;
    let s1 = service.heartbeat("s1");
    service.wait_for_exact(1, Some("s1"), None).await;
    caught_up(&s1, 1).await;

    let _s2 = service.heartbeat("s2");
    service.wait_for_exact(2, Some("s1"), Some("s2")).await;

    service.stop().await;
}

// ============================================================================
// Failover
// ============================================================================

#[tokio::test]
async fn backup_takes_over_and_restarted_server_rejoins() {
    let service = TestService::start().await;
    let s1 = service.heartbeat("s1");
    service.wait_for_exact(1, Some("s1"), None).await;
    let s2 = service.heartbeat("s2");
    service.wait_for_exact(2, Some("s1"), Some("s2")).await;
    caught_up(&s1, 2).await;
    caught_up(&s2, 2).await;

    s1.stop();
    service.wait_for_exact(3, Some("s2"), None).await;

    // A restarted s1 reports view 0 and is absorbed as the new backup.
    caught_up(&s2, 3).await;
    let _s1 = service.heartbeat("s1");
    service.wait_for_exact(4, Some("s2"), Some("s1")).await;

    service.stop().await;
}

#[tokio::test]
async fn idle_third_server_becomes_backup_after_failover() {
    let service = TestService::start().await;
    let s1 = service.heartbeat("s1");
    service.wait_for_exact(1, Some("s1"), None).await;
    let s2 = service.heartbeat("s2");
    service.wait_for_exact(2, Some("s1"), Some("s2")).await;
    caught_up(&s1, 2).await;
    caught_up(&s2, 2).await;

    let _s3 = service.heartbeat("s3");
    tokio::time::sleep(PING_INTERVAL * 3).await;
    // An idle server alone does not change a full view.
    assert_eq!(service.client().get().await.unwrap().viewnum, ViewNumber::new(2));

    s1.stop();
    service.wait_for_exact(3, Some("s2"), Some("s3")).await;

    service.stop().await;
}

#[tokio::test]
async fn restarted_primary_is_replaced() {
    let service = TestService::start().await;
    let s1 = service.heartbeat("s1");
    service.wait_for_exact(1, Some("s1"), None).await;
    let s2 = service.heartbeat("s2");
    service.wait_for_exact(2, Some("s1"), Some("s2")).await;
    caught_up(&s1, 2).await;
    caught_up(&s2, 2).await;

    // Restart s1 well inside the dead timeout: it pings again at once,
    // but with view 0.
    s1.stop();
    let _s1 = service.heartbeat("s1");

    let view = service
        .wait_for_view(|v| v.viewnum >= ViewNumber::new(3))
        .await;
    assert_eq!(view.primary, Some(id("s2")));

    service.stop().await;
}

#[tokio::test]
async fn uninitialized_backup_is_never_promoted() {
    let service = TestService::start().await;
    let s1 = service.heartbeat("s1");
    service.wait_for_exact(1, Some("s1"), None).await;
    caught_up(&s1, 1).await;

    // s2 keeps claiming it has never seen a view.
    let mut client = service.client();
    let stale = tokio::spawn(async move {
        loop {
            let _ = client.ping(&id("s2"), ViewNumber::ZERO).await;
            tokio::time::sleep(PING_INTERVAL).await;
        }
    });
    service.wait_for_exact(2, Some("s1"), Some("s2")).await;
    caught_up(&s1, 2).await;

    s1.stop();
    service.wait_for_exact(2, None, Some("s2")).await;
    tokio::time::sleep(PING_INTERVAL * DEAD_PINGS * 2).await;
    service.wait_for_exact(2, None, Some("s2")).await;

    stale.abort();
    service.stop().await;
}

// ============================================================================
// Shutdown
// ============================================================================

#[tokio::test]
async fn shutdown_stops_serving() {
    let service = TestService::start().await;
    let addr = service.addr;
    let _s1 = service.heartbeat("s1");
    service.wait_for_exact(1, Some("s1"), None).await;

    service.stop().await;

    let mut client = Client::new(
        addr.to_string(),
        ClientConfig {
            request_timeout: Duration::from_millis(200),
        },
    );
    assert!(client.get().await.is_err());
}
