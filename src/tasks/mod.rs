//! The cooperating agents and their one-time wiring.
//!
//! Each agent is a plain `pub async fn` so a board crate can pin it to an
//! executor of the right priority (USB highest, then matrix, hub, RGB,
//! keymap). [`run`] is the reference wiring that joins all of them on one
//! executor; the agents only interact through wait primitives, so the
//! cooperative single-executor composition preserves the same semantics.

pub mod hub;
pub mod keymap;
pub mod matrix;
pub mod rgb;
pub mod usb;
pub mod watchdog;

use embassy_futures::join::{join, join3};
use embassy_time::{Instant, Timer};
use heapless::Vec;
use static_cell::StaticCell;

use crate::config::NUM_SLOTS;
use crate::drivers::{
    AdcBus, HidConn, HubConfigPort, Is31Bus, MatrixBus, NvmBytes, SrBus, StatusLed,
    SystemControl, WatchdogFeeder,
};
use crate::hub::controller::HubController;
use crate::keymap::layout::default_layout;
use crate::keymap::nodes::Node;
use crate::keymap::{Engine, NodeId, MAX_NODES};
use crate::persist::Settings;

/// Everything the board hands over, exactly once.
pub struct Board<M, A, S, H, I, N, C, L, Y, W> {
    pub matrix: M,
    pub adc: A,
    pub sr: S,
    pub hub_cfg: H,
    pub is31: I,
    pub nvm: N,
    pub hid: C,
    pub led: L,
    pub system: Y,
    pub watchdog: W,
}

/// Wire every agent and run them forever. Callable once.
pub async fn run<M, A, S, H, I, N, C, L, Y, W>(board: Board<M, A, S, H, I, N, C, L, Y, W>) -> !
where
    M: MatrixBus,
    A: AdcBus,
    S: SrBus,
    H: HubConfigPort,
    I: Is31Bus,
    N: NvmBytes,
    C: HidConn,
    L: StatusLed,
    Y: SystemControl,
    W: WatchdogFeeder,
{
    log::info!("Starting hubkey firmware core");

    let Board { matrix, adc, sr, hub_cfg, is31, nvm, hid, led, system, watchdog } = board;

    static NODES: StaticCell<Vec<Node, MAX_NODES>> = StaticCell::new();
    static SLOTS: StaticCell<[NodeId; NUM_SLOTS]> = StaticCell::new();
    let built = default_layout();
    let nodes = NODES.init(built.nodes);
    let slots = SLOTS.init(built.slots);
    let engine = Engine::new(nodes.as_mut_slice(), slots, &keymap::KEY_EVENTS);

    let controller = HubController::new(sr, hub_cfg);
    let settings = Settings::new(nvm);

    let _ = join3(
        join(usb::usb_agent(hid, &system), matrix::matrix_agent(matrix, &system)),
        join(
            hub::hub_agent(adc, controller, settings, led, &system),
            rgb::rgb_agent(is31),
        ),
        join(keymap::keymap_agent(engine), watchdog::watchdog_task(watchdog)),
    )
    .await;
    unreachable!()
}

/// A deadline that may not exist: pends forever on `None`.
pub(crate) async fn at_or_never(deadline: Option<Instant>) {
    match deadline {
        Some(t) => Timer::at(t).await,
        None => core::future::pending().await,
    }
}
