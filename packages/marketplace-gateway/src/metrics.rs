//! Prometheus metrics (lock-free atomics).

use std::sync::atomic::{AtomicU64, Ordering};

pub static METRICS: Metrics = Metrics::new();

pub struct Metrics {
    // --- Traffic ---
    pub view_total: AtomicU64,
    pub view_errors: AtomicU64,
    pub tx_total: AtomicU64,
    pub tx_success: AtomicU64,
    pub tx_error: AtomicU64,

    // --- RPC ---
    pub rpc_failovers: AtomicU64,
    pub rpc_errors: AtomicU64,
}

impl Metrics {
    const fn new() -> Self {
        Self {
            view_total: AtomicU64::new(0),
            view_errors: AtomicU64::new(0),
            tx_total: AtomicU64::new(0),
            tx_success: AtomicU64::new(0),
            tx_error: AtomicU64::new(0),
            rpc_failovers: AtomicU64::new(0),
            rpc_errors: AtomicU64::new(0),
        }
    }

    /// Render in Prometheus text exposition format.
    pub fn render(&self, requests: u64) -> String {
        let view_total = self.view_total.load(Ordering::Relaxed);
        let view_errors = self.view_errors.load(Ordering::Relaxed);
        let tx_total = self.tx_total.load(Ordering::Relaxed);
        let tx_success = self.tx_success.load(Ordering::Relaxed);
        let tx_error = self.tx_error.load(Ordering::Relaxed);
        let rpc_failovers = self.rpc_failovers.load(Ordering::Relaxed);
        let rpc_errors = self.rpc_errors.load(Ordering::Relaxed);

        format!(
            "\
# HELP gateway_requests_total HTTP requests received.\n\
# TYPE gateway_requests_total counter\n\
gateway_requests_total {requests}\n\
# HELP gateway_view_total Contract view queries issued.\n\
# TYPE gateway_view_total counter\n\
gateway_view_total {view_total}\n\
# HELP gateway_view_errors_total Failed contract view queries.\n\
# TYPE gateway_view_errors_total counter\n\
gateway_view_errors_total {view_errors}\n\
# HELP gateway_tx_total Wallet transactions submitted.\n\
# TYPE gateway_tx_total counter\n\
gateway_tx_total {tx_total}\n\
# HELP gateway_tx_success_total Transactions that reached finality successfully.\n\
# TYPE gateway_tx_success_total counter\n\
gateway_tx_success_total {tx_success}\n\
# HELP gateway_tx_error_total Transactions rejected, aborted, or timed out.\n\
# TYPE gateway_tx_error_total counter\n\
gateway_tx_error_total {tx_error}\n\
# HELP gateway_rpc_failovers_total Fullnode primary-to-fallback failovers.\n\
# TYPE gateway_rpc_failovers_total counter\n\
gateway_rpc_failovers_total {rpc_failovers}\n\
# HELP gateway_rpc_errors_total Fullnode errors.\n\
# TYPE gateway_rpc_errors_total counter\n\
gateway_rpc_errors_total {rpc_errors}\n"
        )
    }
}
