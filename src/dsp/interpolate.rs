//! Fractional sample reading.

/*
Linear Interpolation
====================

A sample is a list of amplitudes captured at whole-number instants. When we
play it back at any rate other than 1.0, the read head lands BETWEEN those
instants and we have to invent a value for the gap.

Vocabulary
----------

  position    Where the read head is, measured in frames from the start of
              the sample. Fractional: 10.25 means "a quarter of the way from
              frame 10 to frame 11".

  index       The whole-number part of the position, floor(position). The
              frame just behind the read head.

  frac        The fractional part, position - index. Always in [0, 1).

  rate        How far the read head moves per output frame. 1.0 plays the
              sample as recorded, 2.0 an octave up, 0.5 an octave down.


The Math
--------

Draw a straight line between the two bracketing frames and read off the
height at `frac`:

    value = s[index] + frac × (s[index + 1] - s[index])

        s[i+1] ┐            ●
               │          ╱
        value  │ ······ ◆
               │      ╱
        s[i]   │ ●  ╱
               └──┴───┴─────┴──→ position
                  i   p     i+1

When frac = 0 the second term vanishes and we return s[index] exactly, so
playback at rate 1.0 reproduces the source bit-for-bit.


Why Not Something Fancier?
--------------------------

Linear interpolation is a first-order hold. It slightly dulls high
frequencies and lets some aliasing through when pitching up, but it is
cheap, branch-free and never overshoots the two input frames. Cubic or
windowed-sinc readers trade CPU for fidelity; for one-shot playback across
a couple of octaves linear is a reasonable default.


Bounds
------

The reader needs s[index + 1], so the last valid index is len - 2. Callers
(the voice) stop playback as soon as index >= len - 1 rather than reading
past the end or clamping.
*/

/// Blend two neighbouring frames at `frac` in `[0, 1)`.
#[inline]
pub fn lerp(a: f32, b: f32, frac: f32) -> f32 {
    a + frac * (b - a)
}

/// Read `data` at a fractional frame `position`.
///
/// Returns `None` when the position is negative or too close to the end to
/// have a right-hand neighbour (`floor(position) >= data.len() - 1`).
#[inline]
pub fn linear(data: &[f32], position: f64) -> Option<f32> {
    if position < 0.0 {
        return None;
    }

    let index = position as usize;
    if index + 1 >= data.len() {
        return None;
    }

    let frac = (position - index as f64) as f32;
    Some(lerp(data[index], data[index + 1], frac))
}
