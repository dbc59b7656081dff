// SPDX-License-Identifier: GPL-3.0-only
//! In-memory drivers for unit tests
//!
//! Each fake shares its state through `Rc<RefCell<..>>` so a test can keep a
//! clone and inspect what the directory did after handing the driver over.

use std::cell::RefCell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

use crate::error::ProtocolError;

use super::{
    DdcChannel, HandleSet, OutputInfo, OutputSource, OutputToken, PanelChannel, PhysicalHandle,
    RawRange,
};

#[derive(Debug, Clone)]
pub struct FakeOutput {
    pub info: OutputInfo,
    pub describe_fails: bool,
}

#[derive(Debug, Clone, Default)]
pub struct FakeOutputs {
    outputs: Rc<RefCell<Vec<FakeOutput>>>,
}

impl FakeOutputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, token: isize, device_name: &str, is_primary: bool) -> &Self {
        self.outputs.borrow_mut().push(FakeOutput {
            info: OutputInfo {
                token: OutputToken(token),
                device_name: device_name.to_string(),
                is_primary,
            },
            describe_fails: false,
        });
        self
    }

    pub fn push_broken(&self, token: isize) -> &Self {
        self.outputs.borrow_mut().push(FakeOutput {
            info: OutputInfo {
                token: OutputToken(token),
                device_name: String::new(),
                is_primary: false,
            },
            describe_fails: true,
        });
        self
    }

    pub fn clear(&self) {
        self.outputs.borrow_mut().clear();
    }
}

impl OutputSource for FakeOutputs {
    fn outputs(&self) -> Vec<OutputToken> {
        self.outputs.borrow().iter().map(|o| o.info.token).collect()
    }

    fn describe(&self, output: OutputToken) -> Result<OutputInfo, ProtocolError> {
        self.outputs
            .borrow()
            .iter()
            .find(|o| o.info.token == output)
            .filter(|o| !o.describe_fails)
            .map(|o| o.info.clone())
            .ok_or_else(|| ProtocolError::Output(format!("{:#x}", output.0)))
    }
}

#[derive(Debug, Clone)]
pub struct FakeMonitor {
    pub description: String,
    pub handle_count: usize,
    pub brightness: Option<RawRange>,
    pub contrast: Option<RawRange>,
}

impl FakeMonitor {
    pub fn new(description: &str, brightness: RawRange) -> Self {
        Self {
            description: description.to_string(),
            handle_count: 1,
            brightness: Some(brightness),
            contrast: Some(RawRange::new(0, 50, 100)),
        }
    }
}

#[derive(Debug, Default)]
pub struct FakeDdcState {
    pub monitors: HashMap<OutputToken, FakeMonitor>,
    pub live: BTreeSet<isize>,
    pub owners: HashMap<isize, OutputToken>,
    pub next_handle: isize,
    pub fail_writes: bool,
    pub writes: Vec<(&'static str, PhysicalHandle, u32)>,
    pub open_calls: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FakeDdc {
    pub state: Rc<RefCell<FakeDdcState>>,
}

impl FakeDdc {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attach(&self, token: isize, monitor: FakeMonitor) -> &Self {
        self.state
            .borrow_mut()
            .monitors
            .insert(OutputToken(token), monitor);
        self
    }

    pub fn live_handles(&self) -> usize {
        self.state.borrow().live.len()
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.borrow_mut().fail_writes = fail;
    }

    pub fn writes(&self) -> Vec<(&'static str, PhysicalHandle, u32)> {
        self.state.borrow().writes.clone()
    }
}

impl DdcChannel for FakeDdc {
    fn open_handles(&self, output: OutputToken) -> HandleSet {
        let mut state = self.state.borrow_mut();
        state.open_calls += 1;
        let Some(monitor) = state.monitors.get(&output).cloned() else {
            return HandleSet::empty();
        };
        let mut handles = Vec::new();
        for _ in 0..monitor.handle_count {
            state.next_handle += 1;
            let handle = state.next_handle;
            state.live.insert(handle);
            state.owners.insert(handle, output);
            handles.push(PhysicalHandle(handle));
        }
        HandleSet::new(handles, monitor.description)
    }

    fn read_brightness(&self, handle: PhysicalHandle) -> Result<RawRange, ProtocolError> {
        self.lookup(handle, |m| m.brightness, "GetMonitorBrightness")
    }

    fn read_contrast(&self, handle: PhysicalHandle) -> Result<RawRange, ProtocolError> {
        self.lookup(handle, |m| m.contrast, "GetMonitorContrast")
    }

    fn write_brightness(&self, handle: PhysicalHandle, raw: u32) -> Result<(), ProtocolError> {
        self.write("SetMonitorBrightness", handle, raw)
    }

    fn write_contrast(&self, handle: PhysicalHandle, raw: u32) -> Result<(), ProtocolError> {
        self.write("SetMonitorContrast", handle, raw)
    }

    fn close_handles(&self, handles: HandleSet) {
        let mut state = self.state.borrow_mut();
        for handle in handles.into_handles() {
            assert!(
                state.live.remove(&handle.0),
                "handle {} released twice or never opened",
                handle.0
            );
        }
    }
}

impl FakeDdc {
    fn lookup(
        &self,
        handle: PhysicalHandle,
        field: impl Fn(&FakeMonitor) -> Option<RawRange>,
        operation: &'static str,
    ) -> Result<RawRange, ProtocolError> {
        let state = self.state.borrow();
        assert!(state.live.contains(&handle.0), "use of released handle {}", handle.0);
        state
            .owners
            .get(&handle.0)
            .and_then(|token| state.monitors.get(token))
            .and_then(field)
            .ok_or(ProtocolError::DdcCi {
                operation,
                reason: "unsupported VCP code".into(),
            })
    }

    fn write(&self, operation: &'static str, handle: PhysicalHandle, raw: u32) -> Result<(), ProtocolError> {
        let mut state = self.state.borrow_mut();
        assert!(state.live.contains(&handle.0), "use of released handle {}", handle.0);
        if state.fail_writes {
            return Err(ProtocolError::DdcCi {
                operation,
                reason: "monitor did not acknowledge".into(),
            });
        }
        state.writes.push((operation, handle, raw));
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct FakePanelState {
    pub available: bool,
    pub brightness: Option<u32>,
    pub fail_writes: bool,
    pub writes: Vec<(u32, u32)>,
    pub probes: usize,
}

#[derive(Debug, Clone, Default)]
pub struct FakePanel {
    pub state: Rc<RefCell<FakePanelState>>,
}

impl FakePanel {
    pub fn available(brightness: Option<u32>) -> Self {
        let panel = Self::default();
        {
            let mut state = panel.state.borrow_mut();
            state.available = true;
            state.brightness = brightness;
        }
        panel
    }

    pub fn absent() -> Self {
        Self::default()
    }
}

impl PanelChannel for FakePanel {
    fn is_available(&self) -> bool {
        let mut state = self.state.borrow_mut();
        state.probes += 1;
        state.available
    }

    fn brightness(&self) -> Option<u32> {
        self.state.borrow().brightness
    }

    fn set_brightness(&self, percent: u32, timeout_secs: u32) -> Result<(), ProtocolError> {
        let mut state = self.state.borrow_mut();
        if state.fail_writes {
            return Err(ProtocolError::Panel("WmiSetBrightness failed".into()));
        }
        state.writes.push((percent, timeout_secs));
        state.brightness = Some(percent);
        Ok(())
    }
}
