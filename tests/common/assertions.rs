// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 itsakeyfut
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

//! Custom assertions for texture and combiner tests

/// Read the 16-bit texel at `(x, y)`
#[allow(dead_code)]
pub fn texel16(tex: &[u8], real_width: usize, x: usize, y: usize) -> u16 {
    let at = (y * real_width + x) * 2;
    u16::from_le_bytes([tex[at], tex[at + 1]])
}

/// Assert the texel at `dst` equals the texel at `src`
#[allow(dead_code)]
pub fn assert_texel_copied(tex: &[u8], real_width: usize, dst: (usize, usize), src: (usize, usize)) {
    let actual = texel16(tex, real_width, dst.0, dst.1);
    let expected = texel16(tex, real_width, src.0, src.1);
    assert_eq!(
        actual, expected,
        "Texel at {:?} mismatch: expected copy of {:?} (0x{:04X}), got 0x{:04X}",
        dst, src, expected, actual
    );
}
