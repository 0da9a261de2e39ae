// SPDX-License-Identifier: BSD-3-Clause
mod times;
pub use times::*;
