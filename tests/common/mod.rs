use std::net::SocketAddr;

use tokio::sync::oneshot;
use waybill::middleware::Cors;
use waybill::{Router, Server};

/// A server on an ephemeral loopback port. Dropping it shuts the server down.
pub struct Running {
    pub addr: SocketAddr,
    _shutdown: oneshot::Sender<()>,
}

impl Running {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{path}", self.addr)
    }
}

pub async fn spawn(router: Router) -> Running {
    let server = Server::bind("127.0.0.1:0".parse().unwrap())
        .await
        .expect("bind loopback")
        .cors(Some(Cors::allow_origin("*")));
    let addr = server.local_addr().unwrap();
    let (tx, rx) = oneshot::channel::<()>();
    tokio::spawn(server.serve_with_shutdown(router, async {
        let _ = rx.await;
    }));
    Running { addr, _shutdown: tx }
}
