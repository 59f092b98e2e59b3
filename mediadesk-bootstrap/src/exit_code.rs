// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Unix exit codes (BSD `sysexits.h` conventions) mapped directly from
//! [`MediadeskError`] categories, rather than sniffed from error text.

use std::fmt;

use mediadesk_domain::MediadeskError;

/// Exit codes following Unix conventions (BSD sysexits.h).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(i32)]
pub enum ExitCode {
    #[default]
    Success = 0,
    Error = 1,
    UsageError = 64,
    DataError = 65,
    NoInput = 66,
    Unavailable = 69,
    Software = 70,
    CantCreate = 73,
    IoError = 74,
    Protocol = 76,
    Config = 78,
    Interrupted = 130,
    Terminated = 143,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Maps a [`MediadeskError`] to the exit code a shell script would
    /// expect to branch on.
    pub fn from_error(error: &MediadeskError) -> Self {
        match error {
            MediadeskError::InvalidConfiguration(_) => ExitCode::Config,
            MediadeskError::EnumerationFailed(_) | MediadeskError::NoInput(_) => ExitCode::NoInput,
            MediadeskError::MalformedXml(_) | MediadeskError::MissingPictureComponent(_) => ExitCode::DataError,
            MediadeskError::SinkWriteError(_) | MediadeskError::StateWriteError(_) => ExitCode::CantCreate,
            MediadeskError::IoError(_) => ExitCode::IoError,
            MediadeskError::NetworkError(_) => ExitCode::Protocol,
            MediadeskError::SessionAlreadyRunning(_) | MediadeskError::NoActiveSession(_) => ExitCode::UsageError,
            MediadeskError::Cancelled(_) => ExitCode::Interrupted,
            MediadeskError::SerializationError(_) => ExitCode::DataError,
            MediadeskError::ResolverError(_) | MediadeskError::MoveFailed(_) | MediadeskError::TaskTimeout(_) => {
                ExitCode::Unavailable
            }
            MediadeskError::InternalError(_) => ExitCode::Software,
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            ExitCode::Success => "Success",
            ExitCode::Error => "General error",
            ExitCode::UsageError => "Command line usage error",
            ExitCode::DataError => "Data format error",
            ExitCode::NoInput => "Cannot open input",
            ExitCode::Unavailable => "Service unavailable",
            ExitCode::Software => "Internal software error",
            ExitCode::CantCreate => "Cannot create output file",
            ExitCode::IoError => "I/O error",
            ExitCode::Protocol => "Remote error in protocol",
            ExitCode::Config => "Configuration error",
            ExitCode::Interrupted => "Interrupted by signal (SIGINT)",
            ExitCode::Terminated => "Terminated by signal (SIGTERM)",
        }
    }
}

impl fmt::Display for ExitCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.as_i32())
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> i32 {
        code.as_i32()
    }
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> std::process::ExitCode {
        std::process::ExitCode::from(code.as_i32() as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_configuration_maps_to_config() {
        let err = MediadeskError::InvalidConfiguration("bad".into());
        assert_eq!(ExitCode::from_error(&err), ExitCode::Config);
    }

    #[test]
    fn no_input_maps_to_no_input() {
        let err = MediadeskError::NoInput("empty".into());
        assert_eq!(ExitCode::from_error(&err), ExitCode::NoInput);
    }

    #[test]
    fn cancelled_maps_to_interrupted() {
        let err = MediadeskError::Cancelled("stop".into());
        assert_eq!(ExitCode::from_error(&err), ExitCode::Interrupted);
    }

    #[test]
    fn display_includes_numeric_code() {
        assert!(format!("{}", ExitCode::Config).contains("78"));
    }
}
