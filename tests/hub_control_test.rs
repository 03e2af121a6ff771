// Host-side tests for the control word, the hub controller's routing and
// the runtime DFU handler.

use std::cell::RefCell;
use std::rc::Rc;

use embassy_futures::block_on;
use hubkey::adc::{classify_v5v, is_device_connected, is_host_connected, V5vLevel};
use hubkey::config::{
    ADC_5V_HIGH, ADC_5V_LOW, ADC_5V_PANIC, ADC_5V_START_LEVEL, ADC_CON1_NOMINAL,
};
use hubkey::dfu::{DfuOutcome, DfuRequest, DfuRuntime, DfuState};
use hubkey::drivers::{HubConfigPort, SrBus};
use hubkey::hub::controller::HubController;
use hubkey::hub::shift_register as sr;
use hubkey::hub::PortId;

#[derive(Clone, Default)]
struct RecordingSr {
    words: Rc<RefCell<Vec<u16>>>,
}

impl SrBus for RecordingSr {
    fn push_word(&mut self, word: u16) {
        self.words.borrow_mut().push(word);
    }
}

struct GoodConfigPort {
    uploads: usize,
}

impl HubConfigPort for GoodConfigPort {
    type Error = ();

    fn upload_config(&mut self, _serial: Option<&[u8]>) -> Result<(), ()> {
        self.uploads += 1;
        Ok(())
    }

    fn is_active(&self) -> bool {
        true
    }
}

struct FlakyConfigPort {
    failures_left: usize,
    uploads: usize,
}

impl HubConfigPort for FlakyConfigPort {
    type Error = &'static str;

    fn upload_config(&mut self, _serial: Option<&[u8]>) -> Result<(), &'static str> {
        self.uploads += 1;
        if self.failures_left > 0 {
            self.failures_left -= 1;
            Err("nak")
        } else {
            Ok(())
        }
    }

    fn is_active(&self) -> bool {
        true
    }
}

#[test]
fn exactly_one_host_route_per_selection() {
    let srb = RecordingSr::default();
    let mut ctrl = HubController::new(srb.clone(), GoodConfigPort { uploads: 0 });

    block_on(ctrl.select_host_port(PortId::Port1));
    let word = *srb.words.borrow().last().unwrap();
    assert_eq!(word & sr::E_UP_N, 0);
    assert_eq!(word & sr::S_UP, 0);
    assert_ne!(word & sr::SRC_1, 0);
    assert_eq!(word & sr::SRC_2, 0);
    assert_eq!(ctrl.host_port(), Some(PortId::Port1));
    assert_eq!(ctrl.extra_port(), Some(PortId::Port2));

    block_on(ctrl.select_host_port(PortId::Port2));
    let word = *srb.words.borrow().last().unwrap();
    assert_eq!(word & sr::E_UP_N, 0);
    assert_ne!(word & sr::S_UP, 0);
    assert_eq!(word & sr::SRC_1, 0);
    assert_ne!(word & sr::SRC_2, 0);
    assert_eq!(ctrl.host_port(), Some(PortId::Port2));

    // Never both CCs advertising source in any pushed word.
    for &w in srb.words.borrow().iter() {
        assert!(w & sr::SRC_1 == 0 || w & sr::SRC_2 == 0);
    }
}

#[test]
fn disable_all_breaks_both_paths() {
    let srb = RecordingSr::default();
    let mut ctrl = HubController::new(srb.clone(), GoodConfigPort { uploads: 0 });
    block_on(ctrl.select_host_port(PortId::Port1));

    ctrl.disable_all_ports();
    let word = *srb.words.borrow().last().unwrap();
    assert_ne!(word & sr::E_UP_N, 0);
    assert_ne!(word & sr::E_DN1_N, 0);
    assert_eq!(word & (sr::SRC_1 | sr::SRC_2), 0);
    assert_eq!(ctrl.host_port(), None);
}

#[test]
fn extra_port_gates_data_and_power_together() {
    let srb = RecordingSr::default();
    let mut ctrl = HubController::new(srb.clone(), GoodConfigPort { uploads: 0 });
    block_on(ctrl.select_host_port(PortId::Port1));

    ctrl.set_extra_port(PortId::Port2, true);
    let word = *srb.words.borrow().last().unwrap();
    assert_eq!(word & sr::E_DN1_N, 0);
    assert_ne!(word & sr::E_VBUS_2, 0);

    // Panic-disable's observable effect: mux broken, VBUS off.
    ctrl.set_extra_port(PortId::Port2, false);
    let word = *srb.words.borrow().last().unwrap();
    assert_ne!(word & sr::E_DN1_N, 0);
    assert_eq!(word & sr::E_VBUS_2, 0);
}

#[test]
fn bring_up_retries_until_the_hub_accepts() {
    let srb = RecordingSr::default();
    let mut ctrl =
        HubController::new(srb.clone(), FlakyConfigPort { failures_left: 2, uploads: 0 });
    block_on(ctrl.bring_up(None));

    // Finished with the LED drivers released from reset and shutdown.
    let word = *srb.words.borrow().last().unwrap();
    assert_ne!(word & sr::HUB_CONNECT, 0);
    assert_ne!(word & sr::HUB_RESET_N, 0);
    assert_ne!(word & sr::SDB_N, 0);
    assert_eq!(word & sr::IRST, 0);
}

#[test]
fn v5v_levels_follow_the_calibration() {
    assert_eq!(classify_v5v(ADC_5V_HIGH), V5vLevel::High);
    assert_eq!(classify_v5v(ADC_5V_LOW), V5vLevel::Mid);
    assert_eq!(classify_v5v(ADC_5V_START_LEVEL), V5vLevel::Low);
    assert_eq!(classify_v5v(ADC_5V_PANIC), V5vLevel::Unstable);
    assert_eq!(classify_v5v(ADC_5V_PANIC - 1), V5vLevel::Panic);
    assert!(V5vLevel::Panic < V5vLevel::Unstable);
    assert!(V5vLevel::Low < V5vLevel::Mid);
}

#[test]
fn cc_sense_thresholds() {
    // A sink drags the line well below nominal.
    assert!(is_device_connected(PortId::Port1, ADC_CON1_NOMINAL - 300));
    assert!(!is_device_connected(PortId::Port1, ADC_CON1_NOMINAL - 100));

    // Source mode only needs the line above the floor.
    assert!(is_host_connected(PortId::Port1, 150, true));
    assert!(!is_host_connected(PortId::Port1, 50, true));
    // Sink mode needs a rival source pushing above nominal.
    assert!(is_host_connected(PortId::Port1, ADC_CON1_NOMINAL + 300, false));
    assert!(!is_host_connected(PortId::Port1, ADC_CON1_NOMINAL, false));
}

#[test]
fn dfu_runtime_serves_detach_only() {
    let mut dfu = DfuRuntime::new();
    assert_eq!(dfu.state(), DfuState::AppIdle);

    match dfu.handle(DfuRequest::GetStatus) {
        DfuOutcome::Reply { data, len } => {
            assert_eq!(len, 6);
            assert_eq!(data[0], 0);
            assert_eq!(data[4], DfuState::AppIdle as u8);
        }
        other => panic!("unexpected outcome {other:?}"),
    }

    assert_eq!(dfu.handle(DfuRequest::Dnload), DfuOutcome::Stall);
    assert_eq!(dfu.handle(DfuRequest::Upload), DfuOutcome::Stall);

    assert_eq!(dfu.handle(DfuRequest::Detach), DfuOutcome::Detach);
    assert_eq!(dfu.state(), DfuState::AppDetach);

    match dfu.handle(DfuRequest::GetState) {
        DfuOutcome::Reply { data, len } => {
            assert_eq!(len, 1);
            assert_eq!(data[0], DfuState::AppDetach as u8);
        }
        other => panic!("unexpected outcome {other:?}"),
    }
}
