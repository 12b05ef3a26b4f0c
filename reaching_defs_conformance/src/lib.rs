// Copyright 2026 the Reaching Defs Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Conformance tests for `reaching_defs` live in `tests/`.
