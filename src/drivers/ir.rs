//! Learned remote-control table.
//!
//! The receiver decodes frames into [`IrCode`]s (outside this crate); here
//! each of the [`IR_COMMANDS`] commands is bound to one learned code.
//! Learning walks the commands in order and stores the next distinct code
//! for each.

use log::info;

use crate::app::ports::IrCode;

pub const IR_COMMANDS: usize = 12;

pub type IrTable = [Option<IrCode>; IR_COMMANDS];

/// Commands in learning (and storage) order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum IrCommand {
    PowerToggle = 0,
    AmbientToggle,
    BrightnessUp,
    BrightnessDown,
    NextMode,
    PrevMode,
    HourUp,
    HourDown,
    MinuteUp,
    MinuteDown,
    AutoBrightnessToggle,
    StopAudio,
}

impl IrCommand {
    pub const ALL: [Self; IR_COMMANDS] = [
        Self::PowerToggle,
        Self::AmbientToggle,
        Self::BrightnessUp,
        Self::BrightnessDown,
        Self::NextMode,
        Self::PrevMode,
        Self::HourUp,
        Self::HourDown,
        Self::MinuteUp,
        Self::MinuteDown,
        Self::AutoBrightnessToggle,
        Self::StopAudio,
    ];
}

/// Command bound to `code`, if it was learned.
pub fn lookup(table: &IrTable, code: IrCode) -> Option<IrCommand> {
    table
        .iter()
        .position(|c| *c == Some(code))
        .map(|i| IrCommand::ALL[i])
}

/// Progress of one learned code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnStep {
    /// Stored for this command; more to go.
    Stored(IrCommand),
    /// Last command stored; the table is complete.
    Done,
    /// Repeat of a code already learned in this session.
    Ignored,
}

#[derive(Debug, Default)]
pub struct IrLearner {
    next: Option<usize>,
}

impl IrLearner {
    pub const fn new() -> Self {
        Self { next: None }
    }

    pub fn start(&mut self) {
        info!("ir: learning {} commands", IR_COMMANDS);
        self.next = Some(0);
    }

    pub fn cancel(&mut self) {
        self.next = None;
    }

    pub const fn is_learning(&self) -> bool {
        self.next.is_some()
    }

    /// Command waiting for its code.
    pub fn pending(&self) -> Option<IrCommand> {
        self.next.map(|i| IrCommand::ALL[i])
    }

    pub fn learn(&mut self, table: &mut IrTable, code: IrCode) -> LearnStep {
        let Some(i) = self.next else {
            return LearnStep::Ignored;
        };
        // Held keys repeat their frame.
        if table[..i].contains(&Some(code)) {
            return LearnStep::Ignored;
        }
        table[i] = Some(code);
        let cmd = IrCommand::ALL[i];
        info!("ir: learned {cmd:?}");
        if i + 1 == IR_COMMANDS {
            self.next = None;
            LearnStep::Done
        } else {
            self.next = Some(i + 1);
            LearnStep::Stored(cmd)
        }
    }
}
