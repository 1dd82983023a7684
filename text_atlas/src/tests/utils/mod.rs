// Copyright 2025 the Parley Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

mod engine;
mod env;
mod renderer;

pub(crate) use engine::{ADVANCE, BoxEngine};
pub(crate) use env::{TestContext, context, context_with, record_errors};
pub(crate) use renderer::RecordingRenderer;
