use crate::timer::OneShot;
use log::{debug, error, info, warn};
use nom::{
    bytes::complete::{tag, take_while1},
    character::complete::{multispace0, multispace1, not_line_ending, space0, space1},
    error::{Error, ErrorKind},
    multi::{many0, many1},
    IResult,
};
use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

/// How long the emitter visual stays lit after a successful send.
const TRANSMIT_PULSE: Duration = Duration::from_secs(1);

/// One key on a remote panel. A missing code defaults to `KEY_<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteKey {
    pub name: String,
    pub code: Option<String>,
}

impl RemoteKey {
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            code: None,
        }
    }

    #[must_use]
    pub fn with_code(name: &str, code: &str) -> Self {
        Self {
            name: name.to_owned(),
            code: Some(code.to_owned()),
        }
    }

    #[must_use]
    pub fn resolve_code(&self) -> String {
        self.code
            .clone()
            .unwrap_or_else(|| format!("KEY_{}", self.name))
    }
}

/// Geometry and key grid of the on-screen remote. `None` entries are gaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteLayout {
    pub width: u32,
    pub height: u32,
    pub key_width: u32,
    pub key_height: u32,
    pub key_rows: Vec<Vec<Option<RemoteKey>>>,
}

impl RemoteLayout {
    /// Every code on the panel, reading order.
    #[must_use]
    pub fn key_codes(&self) -> Vec<String> {
        self.key_rows
            .iter()
            .flatten()
            .flatten()
            .map(RemoteKey::resolve_code)
            .collect()
    }
}

struct ReceiverInner {
    config: String,
    key_codes: Vec<String>,
    pressed: Mutex<VecDeque<String>>,
}

/// Receiver side of the infrared link: panel key presses append their codes
/// to an unbounded FIFO that application code drains at its own pace.
#[derive(Clone)]
pub struct InfraredReceiver {
    inner: Arc<ReceiverInner>,
}

impl InfraredReceiver {
    #[must_use]
    pub fn new(config: &str, layout: &RemoteLayout) -> Self {
        Self {
            inner: Arc::new(ReceiverInner {
                config: config.to_owned(),
                key_codes: layout.key_codes(),
                pressed: Mutex::new(VecDeque::new()),
            }),
        }
    }

    #[must_use]
    pub fn config_name(&self) -> &str {
        &self.inner.config
    }

    #[must_use]
    pub fn key_codes(&self) -> &[String] {
        &self.inner.key_codes
    }

    pub fn clear_codes(&self) {
        self.inner.pressed.lock().unwrap().clear();
    }

    /// Pops the oldest pending code, or `None` when nothing is pending.
    #[must_use]
    pub fn get_next_code(&self) -> Option<String> {
        self.inner.pressed.lock().unwrap().pop_front()
    }

    pub fn key_press(&self, code: &str) {
        debug!("infrared key press: {code}");
        self.inner.pressed.lock().unwrap().push_back(code.to_owned());
    }
}

/// Remote name to valid-code table, immutable once handed to the emitter.
///
/// Parsable from a lirc-flavored text block:
///
/// ```text
/// begin remote
///   name remote1
///   begin codes
///     KEY_UP 0x40BF
///   end codes
/// end remote
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RemoteControls(HashMap<String, Vec<String>>);

impl RemoteControls {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: &str, codes: &[&str]) {
        self.0.insert(
            name.to_owned(),
            codes.iter().map(|&c| c.to_owned()).collect(),
        );
    }

    #[must_use]
    pub fn get(&self, remote: &str) -> Option<&[String]> {
        self.0.get(remote).map(Vec::as_slice)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    pub fn from_str(input: &str) -> Result<Self, String> {
        match Self::parse(input) {
            Ok(("", controls)) => Ok(controls),
            Ok((rest, _)) => Err(format!(
                "trailing input in remote definitions: {:?}",
                rest.lines().next().unwrap_or(rest)
            )),
            Err(err) => Err(format!("malformed remote definitions: {err}")),
        }
    }

    fn parse(i: &str) -> IResult<&str, Self> {
        let (i, remotes) = many1(remote)(i)?;
        let (i, _) = multispace0(i)?;

        Ok((i, Self(remotes.into_iter().collect())))
    }
}

fn token(i: &str) -> IResult<&str, &str> {
    take_while1(|c: char| !c.is_whitespace())(i)
}

fn remote(i: &str) -> IResult<&str, (String, Vec<String>)> {
    let (i, _) = multispace0(i)?;
    let (i, _) = tag("begin remote")(i)?;
    let (i, _) = multispace1(i)?;
    let (i, _) = tag("name")(i)?;
    let (i, _) = space1(i)?;
    let (i, name) = token(i)?;
    let (i, codes) = codes_block(i)?;
    let (i, _) = multispace0(i)?;
    let (i, _) = tag("end remote")(i)?;

    Ok((i, (name.to_owned(), codes)))
}

fn codes_block(i: &str) -> IResult<&str, Vec<String>> {
    let (i, _) = multispace0(i)?;
    let (i, _) = tag("begin codes")(i)?;
    let (i, codes) = many0(code_line)(i)?;
    let (i, _) = multispace0(i)?;
    let (i, _) = tag("end codes")(i)?;

    Ok((i, codes))
}

fn code_line(i: &str) -> IResult<&str, String> {
    let (rest, _) = multispace0(i)?;
    let (rest, code) = token(rest)?;

    if code == "end" {
        return Err(nom::Err::Error(Error::new(i, ErrorKind::Tag)));
    }

    // Payload column (scancode) is ignored.
    let (rest, _) = space0(rest)?;
    let (rest, _) = not_line_ending(rest)?;

    Ok((rest, code.to_owned()))
}

/// Outcome of a `send_once` against a known remote.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SendReport {
    pub transmitted: Vec<String>,
    pub rejected: Vec<String>,
}

struct EmitterInner {
    remotes: RemoteControls,
    transmitting: AtomicBool,
    off_timer: Mutex<OffSlot>,
}

#[derive(Default)]
struct OffSlot {
    epoch: u64,
    pending: Option<OneShot>,
}

/// Emitter side of the infrared link. Valid codes light the transmit visual
/// for one second; a new send restarts that second instead of stacking.
#[derive(Clone)]
pub struct InfraredEmitter {
    inner: Arc<EmitterInner>,
}

impl InfraredEmitter {
    #[must_use]
    pub fn new(remotes: RemoteControls) -> Self {
        Self {
            inner: Arc::new(EmitterInner {
                remotes,
                transmitting: AtomicBool::new(false),
                off_timer: Mutex::new(OffSlot::default()),
            }),
        }
    }

    #[must_use]
    pub fn list_remotes(&self) -> Vec<&str> {
        self.inner.remotes.names().collect()
    }

    /// `None` for an unknown remote name, which is also reported.
    #[must_use]
    pub fn list_codes(&self, remote: &str) -> Option<&[String]> {
        let codes = self.inner.remotes.get(remote);

        if codes.is_none() {
            error!("{remote}: invalid remote control");
        }

        codes
    }

    /// Validates every code against the remote's table; invalid codes are
    /// reported and skipped without aborting the rest. An unknown remote
    /// aborts the whole send with no visual change.
    pub fn send_once(&self, remote: &str, codes: &[&str], count: u32) -> Option<SendReport> {
        let valid = self.list_codes(remote)?;
        let count = count.max(1);

        let mut report = SendReport::default();

        for &code in codes {
            if valid.iter().any(|c| c == code) {
                info!("{code} of remote {remote:?} transmitted (x{count})");
                report.transmitted.push(code.to_owned());
            } else {
                warn!("{code}: invalid code for remote {remote:?}");
                report.rejected.push(code.to_owned());
            }
        }

        if !report.transmitted.is_empty() {
            self.pulse();
        }

        Some(report)
    }

    #[must_use]
    pub fn is_transmitting(&self) -> bool {
        self.inner.transmitting.load(Ordering::Acquire)
    }

    fn pulse(&self) {
        let inner = &self.inner;

        inner.transmitting.store(true, Ordering::Release);

        let mut slot = inner.off_timer.lock().unwrap();
        slot.epoch += 1;
        let epoch = slot.epoch;

        let this = Arc::clone(inner);
        slot.pending = Some(OneShot::schedule(TRANSMIT_PULSE, move || {
            let mut slot = this.off_timer.lock().unwrap();
            if slot.epoch != epoch {
                return;
            }

            this.transmitting.store(false, Ordering::Release);
            slot.pending = None;
        }));
    }
}
