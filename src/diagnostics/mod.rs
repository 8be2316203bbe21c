// Copyright 2024 OctoFHIR Team
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Error catalog, diagnostic records, the per-call diagnostics bag, and the
//! logger abstraction (spec component A).

pub mod bag;
pub mod catalog;
pub mod diagnostic;
pub mod formatter;
pub mod logger;

pub use bag::{Bucket, DiagnosticsBag};
pub use catalog::{render_template, ErrorCode};
pub use diagnostic::{Diagnostic, Position};
pub use formatter::{DiagnosticFormatter, Format};
pub use logger::{default_logger, Logger, NullLogger, SharedLogger, StdLogger};
