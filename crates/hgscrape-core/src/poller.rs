// ── Poll cycle ──
//
// One tick: fetch both pages, extract every group, reconstruct, publish.
// A fetch failure skips the tick without touching any counter. An
// extraction failure only skips the counters of its own group.

use std::time::Duration;

use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::CoreError;
use crate::extract::{self, ExtractError};
use crate::model::{CounterId, Direction, Interface, WifiBand};
use crate::reconstruct::{self, ReconstructionState};
use crate::sink::MetricSink;
use crate::source::{PageSource, RouterPages};

/// What happened to the counters during one tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickReport {
    /// Counters written to the sink.
    pub published: usize,
    /// WiFi counters skipped because the router reported zero.
    pub suppressed: usize,
    /// Groups (WAN, one LAN port, WLAN) that could not be extracted.
    pub parse_failures: usize,
}

/// Drives the fetch, extract, reconstruct and publish pipeline.
///
/// Owns the reconstruction state for as long as it lives; dropping the
/// poller forgets all WAN wrap history.
pub struct Poller<S, K> {
    source: S,
    sink: K,
    state: ReconstructionState,
}

impl<S: PageSource, K: MetricSink> Poller<S, K> {
    pub fn new(source: S, sink: K, wan_multiplier: bool) -> Self {
        Self {
            source,
            sink,
            state: ReconstructionState::new(wan_multiplier),
        }
    }

    pub fn state(&self) -> &ReconstructionState {
        &self.state
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// Run one full poll cycle.
    ///
    /// Returns `Err` only when the pages could not be fetched; in that case
    /// neither the sink nor the reconstruction state is touched.
    pub async fn tick(&mut self) -> Result<TickReport, CoreError> {
        let pages = self.source.fetch_pages().await?;
        Ok(self.apply(&pages))
    }

    /// Extract, reconstruct and publish from already-fetched pages.
    pub fn apply(&mut self, pages: &RouterPages) -> TickReport {
        let mut report = TickReport::default();

        match extract::extract_wan(&pages.wan_status) {
            Ok(reading) => {
                for (direction, raw) in [(Direction::Up, reading.up), (Direction::Down, reading.down)] {
                    let value = self.state.wan_total(direction, raw);
                    self.publish(CounterId::new(Interface::Wan, direction), value, &mut report);
                }
            }
            Err(e) => parse_failed(&e, &mut report),
        }

        let lan = extract::extract_lan(&pages.lan_hosts);
        for (port, reading) in lan.iter() {
            match reading {
                Ok(reading) => {
                    for (direction, sample) in [(Direction::Up, reading.up), (Direction::Down, reading.down)] {
                        let id = CounterId::new(Interface::Lan(port), direction);
                        self.publish(id, reconstruct::lan_total(sample), &mut report);
                    }
                }
                Err(e) => parse_failed(e, &mut report),
            }
        }

        match extract::extract_wlan(&pages.lan_hosts) {
            Ok(reading) => {
                for (band, band_reading) in [
                    (WifiBand::Ghz2_4, reading.band_2_4),
                    (WifiBand::Ghz5, reading.band_5),
                ] {
                    for (direction, raw) in [(Direction::Up, band_reading.up), (Direction::Down, band_reading.down)] {
                        let id = CounterId::new(Interface::Wifi(band), direction);
                        match reconstruct::wifi_value(raw) {
                            Some(value) => self.publish(id, value, &mut report),
                            None => {
                                debug!(counter = %id, "zero reading, keeping previous value");
                                report.suppressed += 1;
                            }
                        }
                    }
                }
            }
            Err(e) => parse_failed(&e, &mut report),
        }

        report
    }

    fn publish(&self, id: CounterId, value: u64, report: &mut TickReport) {
        self.sink.set(id, value);
        report.published += 1;
    }

    /// Poll every `every` until `cancel` fires.
    ///
    /// The first tick runs immediately. Ticks that overrun the interval delay
    /// the next one rather than bursting. Cancellation is checked between
    /// ticks; a tick in flight always completes.
    pub async fn run(mut self, every: Duration, cancel: CancellationToken) {
        let mut interval = tokio::time::interval(every);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(interval_secs = every.as_secs(), "poller started");

        loop {
            tokio::select! {
                biased;
                () = cancel.cancelled() => break,
                _ = interval.tick() => {
                    match self.tick().await {
                        Ok(report) => debug!(
                            published = report.published,
                            suppressed = report.suppressed,
                            parse_failures = report.parse_failures,
                            "poll tick complete"
                        ),
                        Err(e) => warn!(error = %e, "poll tick failed, counters left unchanged"),
                    }
                }
            }
        }

        info!("poller stopped");
    }
}

fn parse_failed(error: &ExtractError, report: &mut TickReport) {
    warn!(error = %error, "failed to extract counters");
    report.parse_failures += 1;
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use pretty_assertions::assert_eq;
    use tokio_test::{assert_err, assert_ok};

    use metrics_exporter_prometheus::PrometheusBuilder;

    use super::*;
    use crate::model::LanPort;
    use crate::sink::{MemorySink, PrometheusSink};

    // ── Fixtures ────────────────────────────────────────────────────

    struct ScriptedSource {
        responses: Mutex<VecDeque<Result<RouterPages, CoreError>>>,
        calls: Arc<AtomicUsize>,
    }

    impl ScriptedSource {
        fn new(responses: impl IntoIterator<Item = Result<RouterPages, CoreError>>) -> Self {
            Self {
                responses: Mutex::new(responses.into_iter().collect()),
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    impl PageSource for ScriptedSource {
        async fn fetch_pages(&self) -> Result<RouterPages, CoreError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(offline()))
        }
    }

    fn offline() -> CoreError {
        CoreError::ConnectionFailed {
            url: "http://192.168.1.1/".into(),
            reason: "connection refused".into(),
        }
    }

    fn wan_page(up: u64, down: u64) -> String {
        format!(
            r#"new stWanStats("InternetGatewayDevice.WANDevice.1.WANConnectionDevice.1.WANIPConnection.1.Stats","0","{up}","0","0","0","{down}","0"),"#
        )
    }

    /// LAN port `n` reports one upstream wrap plus `100 * n` bytes and
    /// `50 * n` downstream bytes with no wraps.
    fn lan_hosts_page(ports: &[u8], wifi_2_4_up: u64) -> String {
        let mut page = String::new();
        for &n in ports {
            let up = 100 * u64::from(n);
            let down = 50 * u64::from(n);
            page.push_str(&format!(
                r#"new stLanStats("InternetGatewayDevice.X_HW_DEBUG.AMP.LANPort.{n}.Statistics","1","{up}","0","0","0","0","0","{down}"),"#
            ));
        }
        page.push_str(&format!(r#"new stPacketInfo("wl0","10","0","{wifi_2_4_up}","0"),"#));
        page.push_str(r#"new stPacketInfo("wl1","999","0","999","0"),"#);
        page.push_str(r#"new stPacketInfo("wl2","30","0","40","0"),"#);
        page
    }

    fn pages(wan_up: u64, wifi_2_4_up: u64) -> RouterPages {
        RouterPages {
            wan_status: wan_page(wan_up, 5000),
            lan_hosts: lan_hosts_page(&[1, 2, 3, 4], wifi_2_4_up),
        }
    }

    fn poller(
        responses: impl IntoIterator<Item = Result<RouterPages, CoreError>>,
    ) -> Poller<ScriptedSource, MemorySink> {
        Poller::new(ScriptedSource::new(responses), MemorySink::new("vodafone"), true)
    }

    fn lan(n: u8, direction: Direction) -> CounterId {
        CounterId::new(Interface::Lan(LanPort::new(n).unwrap()), direction)
    }

    const WAN_UP: CounterId = CounterId::new(Interface::Wan, Direction::Up);
    const WIFI_2_4_UP: CounterId = CounterId::new(Interface::Wifi(WifiBand::Ghz2_4), Direction::Up);

    // ── Tick behaviour ──────────────────────────────────────────────

    #[tokio::test]
    async fn full_tick_publishes_every_counter() {
        let mut poller = poller([Ok(pages(100, 500))]);

        let report = assert_ok!(poller.tick().await);

        assert_eq!(
            report,
            TickReport {
                published: 14,
                suppressed: 0,
                parse_failures: 0,
            }
        );
        let sink = poller.sink();
        assert_eq!(sink.get(WAN_UP), Some(100));
        assert_eq!(sink.get(lan(1, Direction::Up)), Some(4_294_967_396));
        assert_eq!(sink.get(lan(4, Direction::Down)), Some(200));
        assert_eq!(sink.get(WIFI_2_4_UP), Some(500));
        assert_eq!(
            sink.get(CounterId::new(Interface::Wifi(WifiBand::Ghz5), Direction::Down)),
            Some(30)
        );
    }

    #[tokio::test]
    async fn missing_lan_port_only_skips_that_port() {
        let mut poller = poller([Ok(RouterPages {
            wan_status: wan_page(100, 200),
            lan_hosts: lan_hosts_page(&[1, 2, 4], 500),
        })]);

        let report = assert_ok!(poller.tick().await);

        assert_eq!(report.published, 12);
        assert_eq!(report.parse_failures, 1);
        assert_eq!(poller.sink().get(lan(3, Direction::Up)), None);
        assert_eq!(poller.sink().get(lan(4, Direction::Up)), Some(4_294_967_696));
    }

    #[tokio::test]
    async fn unreadable_wan_page_keeps_lan_and_wifi() {
        let mut poller = poller([Ok(RouterPages {
            wan_status: "<html>session expired</html>".into(),
            lan_hosts: lan_hosts_page(&[1, 2, 3, 4], 500),
        })]);

        let report = assert_ok!(poller.tick().await);

        assert_eq!(report.published, 12);
        assert_eq!(report.parse_failures, 1);
        assert_eq!(poller.sink().get(WAN_UP), None);
        assert_eq!(poller.state().wan(Direction::Up).previous_raw(), 0);
    }

    #[tokio::test]
    async fn wifi_zero_keeps_previous_value() {
        let mut poller = poller([Ok(pages(1, 500)), Ok(pages(1, 0)), Ok(pages(1, 700))]);
        let mut seen = Vec::new();
        let mut suppressed = Vec::new();

        for _ in 0..3 {
            let report = assert_ok!(poller.tick().await);
            seen.push(poller.sink().get(WIFI_2_4_UP));
            suppressed.push(report.suppressed);
        }

        assert_eq!(seen, vec![Some(500), Some(500), Some(700)]);
        assert_eq!(suppressed, vec![0, 1, 0]);
    }

    #[tokio::test]
    async fn wan_wrap_is_reconstructed_across_ticks() {
        let mut poller = poller([100, 200, 50, 300].map(|up| Ok(pages(up, 500))));
        let mut seen = Vec::new();

        for _ in 0..4 {
            assert_ok!(poller.tick().await);
            seen.push(poller.sink().get(WAN_UP));
        }

        assert_eq!(seen, vec![Some(100), Some(200), Some(100), Some(600)]);
    }

    #[test]
    fn prometheus_endpoint_holds_the_highest_wan_value() {
        let recorder = PrometheusBuilder::new().build_recorder();
        let handle = recorder.handle();
        let mut exported = Vec::new();

        metrics::with_local_recorder(&recorder, || {
            let sink = PrometheusSink::register("vodafone");
            let mut poller = Poller::new(ScriptedSource::new([]), sink, false);
            for up in [100, 200, 50, 300] {
                poller.apply(&pages(up, 500));
                exported.push(rendered_value(&handle.render(), "vodafone_wan_up_bytes_total"));
            }
        });

        assert_eq!(exported, vec![Some(100), Some(200), Some(200), Some(300)]);
    }

    fn rendered_value(text: &str, name: &str) -> Option<u64> {
        text.lines()
            .find_map(|line| line.strip_prefix(name)?.strip_prefix(' '))
            .and_then(|value| value.parse().ok())
    }

    #[tokio::test]
    async fn fetch_failure_leaves_counters_and_state_untouched() {
        let mut poller = poller([Ok(pages(100, 500)), Err(offline())]);
        assert_ok!(poller.tick().await);
        let before_values = poller.sink().snapshot();
        let before_state = poller.state().clone();

        let err = assert_err!(poller.tick().await);

        assert!(matches!(err, CoreError::ConnectionFailed { .. }));
        assert_eq!(poller.sink().snapshot(), before_values);
        assert_eq!(poller.state(), &before_state);
    }

    // ── Run loop ────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn run_ticks_immediately_then_on_interval() {
        let source = ScriptedSource::new([Ok(pages(100, 500))]);
        let calls = Arc::clone(&source.calls);
        let sink = Arc::new(MemorySink::new("vodafone"));
        let poller = Poller::new(source, Arc::clone(&sink), true);
        let cancel = CancellationToken::new();

        let handle = tokio::spawn(poller.run(Duration::from_secs(60), cancel.clone()));

        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(sink.get(WAN_UP), Some(100));

        tokio::time::sleep(Duration::from_secs(120)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 3);

        cancel.cancel();
        handle.await.unwrap();
        // Failed ticks after the first one leave the published value alone.
        assert_eq!(sink.get(WAN_UP), Some(100));
    }

    #[tokio::test(start_paused = true)]
    async fn run_stops_when_cancelled_before_first_tick() {
        let source = ScriptedSource::new([]);
        let calls = Arc::clone(&source.calls);
        let poller = Poller::new(source, MemorySink::new("vodafone"), true);
        let cancel = CancellationToken::new();
        cancel.cancel();

        poller.run(Duration::from_secs(60), cancel).await;

        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
