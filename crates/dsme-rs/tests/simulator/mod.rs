// crates/dsme-rs/tests/simulator/mod.rs
pub mod interface;

pub use interface::{SimulatedRadio, TxKind};

use dsme_rs::frame::MacHeader;
use dsme_rs::pib::{MacPib, PhyPib, PibHelper};
use dsme_rs::types::ShortAddress;
use dsme_rs::{DsmeIndication, DsmeLayer};
use std::cell::Cell;
use std::collections::HashSet;
use std::rc::Rc;

/// Upper bound of transmission rounds per pump, guards against ping-pong loops.
const MAX_PUMP_ROUNDS: usize = 64;

/// Installs a test logger. Safe to call from every test.
pub fn init_logging() {
    let _ = env_logger::Builder::new()
        .is_test(true)
        .filter_level(log::LevelFilter::Trace)
        .try_init();
}

/// A record of a frame that went on air.
#[derive(Debug, Clone)]
pub struct AirFrame {
    pub header: MacHeader,
    pub src: ShortAddress,
    pub kind: TxKind,
    pub time: u32,
}

/// A virtual radio medium with a global symbol clock.
///
/// Every transmission reaches all other nodes tuned to the same channel;
/// address filtering is left to the nodes. Superframes are driven globally,
/// so all synchronized nodes share one timeline.
pub struct VirtualNetwork {
    clock: Rc<Cell<u32>>,
    superframe_counter: u32,
    /// Frames sent by these nodes are lost.
    pub drop_from: HashSet<ShortAddress>,
    /// Trace of all frames sent on the network (for assertions).
    pub history: Vec<AirFrame>,
}

impl VirtualNetwork {
    pub fn new() -> Self {
        Self {
            clock: Rc::new(Cell::new(0)),
            superframe_counter: 0,
            drop_from: HashSet::new(),
            history: Vec::new(),
        }
    }

    pub fn clock(&self) -> Rc<Cell<u32>> {
        Rc::clone(&self.clock)
    }

    pub fn now(&self) -> u32 {
        self.clock.get()
    }

    /// Creates a node whose radio runs on this network's clock.
    pub fn create_node(&self, mac: MacPib, phy: PhyPib) -> NodeHarness {
        let address = mac.short_address;
        let radio = SimulatedRadio::new(self.clock(), phy.current_channel);
        let layer = DsmeLayer::new(mac, phy, radio).expect("valid PIB");
        NodeHarness {
            layer,
            address,
            indications: Vec::new(),
        }
    }

    /// Advances time and fires expired ack timers.
    pub fn advance(&mut self, nodes: &mut [NodeHarness], symbols: u32) {
        self.clock.set(self.clock.get() + symbols);
        let now = self.now();
        for node in nodes.iter_mut() {
            if let Some(handle) = node.layer.platform_mut().expired_ack_timer(now) {
                let indications = node.layer.on_ack_timer(handle);
                node.indications.extend(indications);
            }
        }
        self.pump(nodes);
    }

    /// Delivers queued transmissions until the medium is quiet.
    pub fn pump(&mut self, nodes: &mut [NodeHarness]) {
        for _ in 0..MAX_PUMP_ROUNDS {
            let mut idle = true;
            for i in 0..nodes.len() {
                let transmissions = nodes[i].layer.platform_mut().take_tx();
                for tx in transmissions {
                    idle = false;
                    self.transmit(nodes, i, &tx);
                    let sender = &mut nodes[i];
                    let indications = match tx.kind {
                        TxKind::Direct | TxKind::DelayedAck => sender.layer.on_send_done(true),
                        TxKind::Cap => {
                            if let Some(frame) = sender.layer.platform_mut().pop_cap_frame() {
                                sender.layer.on_cap_sent(frame, true);
                            }
                            Vec::new()
                        }
                    };
                    sender.indications.extend(indications);
                }
            }
            if idle {
                return;
            }
        }
        panic!("network did not settle");
    }

    fn transmit(&mut self, nodes: &mut [NodeHarness], sender: usize, tx: &interface::Transmission) {
        let src = nodes[sender].address;
        self.history.push(AirFrame {
            header: tx.frame.header.clone(),
            src,
            kind: tx.kind,
            time: self.now(),
        });
        if self.drop_from.contains(&src) {
            return;
        }
        for (j, node) in nodes.iter_mut().enumerate() {
            if j == sender || node.layer.platform().channel() != tx.channel {
                continue;
            }
            let mut frame = interface::on_air_copy(&tx.frame);
            frame.rx_info.start_of_frame_symbol_counter = self.now();
            frame.rx_info.link_quality = 255;
            let indications = node.layer.on_frame_received(frame);
            node.indications.extend(indications);
        }
    }

    /// Runs one superframe on every node: superframe start, CAP, start of the
    /// CFP. The numbering follows the superframe structure of the first node.
    pub fn run_superframe(&mut self, nodes: &mut [NodeHarness]) {
        let mac = nodes[0].layer.mac_pib().clone();
        let phy = nodes[0].layer.phy_pib().clone();
        let helper = PibHelper::new(&mac, &phy);
        let per_msf = u32::from(helper.superframes_per_multi_superframe());
        let per_bi = u32::from(helper.superframes_per_beacon_interval());
        let half = helper.symbols_per_superframe() / 2;

        let sd_index = self.superframe_counter % per_bi;
        let superframe = (sd_index % per_msf) as u16;
        let multi_superframe = (sd_index / per_msf) as u16;

        for node in nodes.iter_mut() {
            let indications = node.layer.on_superframe(superframe, multi_superframe, 0);
            node.indications.extend(indications);
        }
        self.pump(nodes);
        self.advance(nodes, half);

        for node in nodes.iter_mut() {
            let indications = node.layer.on_start_of_cfp();
            node.indications.extend(indications);
        }
        self.pump(nodes);
        self.advance(nodes, half);
        self.superframe_counter += 1;
    }
}

/// Wraps a `DsmeLayer` and the indications it produced.
pub struct NodeHarness {
    pub layer: DsmeLayer<SimulatedRadio>,
    pub address: ShortAddress,
    pub indications: Vec<DsmeIndication>,
}

impl NodeHarness {
    /// Removes and returns the collected indications.
    pub fn take_indications(&mut self) -> Vec<DsmeIndication> {
        std::mem::take(&mut self.indications)
    }
}
