//! Scroll math, free of the DOM.
//!
//! A section is tall and its sticky child stays pinned while the page
//! scrolls through it. Pinned progress runs from 0 when the section top
//! meets the viewport top to 1 when its bottom meets the viewport bottom.
//! Full-pass progress runs from the section entering the viewport at the
//! bottom to leaving it at the top.

use serde::{Deserialize, Serialize};

pub fn clamp01(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

pub fn smoothstep(edge0: f64, edge1: f64, x: f64) -> f64 {
    let t = clamp01((x - edge0) / (edge1 - edge0));
    t * t * (3.0 - 2.0 * t)
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ScrollProgress {
    pub pinned: f64,
    pub full_pass: f64,
}

impl ScrollProgress {
    /// `section_top` is the offset from the document top, all values in px
    pub fn compute(
        scroll_y: f64,
        viewport_height: f64,
        section_top: f64,
        section_height: f64,
    ) -> Self {
        // a section no taller than the viewport never pins
        let ratio = |travelled: f64, span: f64| {
            if span > 0.0 {
                clamp01(travelled / span)
            } else {
                0.0
            }
        };
        ScrollProgress {
            pinned: ratio(scroll_y - section_top, section_height - viewport_height),
            full_pass: ratio(
                scroll_y + viewport_height - section_top,
                section_height + viewport_height,
            ),
        }
    }

    pub fn select(&self, full_pass: bool) -> f64 {
        if full_pass {
            self.full_pass
        } else {
            self.pinned
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ParallaxTuning {
    /// px the overlay travels upward over a full pinned pass at rate 1
    pub text_travel: f64,
    /// px the background travels downward over a full pinned pass at rate 1
    pub background_travel: f64,
    pub text_multiplier: f64,
    pub video_multiplier: f64,
    pub fade_in_end: f64,
    pub fade_out_start: f64,
    pub scrub_interval_ms: f64,
}

impl Default for ParallaxTuning {
    fn default() -> Self {
        Self {
            text_travel: 300.0,
            background_travel: 120.0,
            text_multiplier: 1.0,
            video_multiplier: 1.0,
            fade_in_end: 0.15,
            fade_out_start: 0.85,
            scrub_interval_ms: 80.0,
        }
    }
}

/// Visual state of one section for one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParallaxFrame {
    pub text_offset: f64,
    pub background_offset: f64,
    pub opacity: f64,
}

impl ParallaxFrame {
    pub fn compute(
        progress: f64,
        text_speed: f64,
        video_speed: f64,
        crossfade: bool,
        tuning: &ParallaxTuning,
    ) -> Self {
        let text_rate = text_speed * tuning.text_multiplier;
        let video_rate = video_speed * tuning.video_multiplier;
        ParallaxFrame {
            text_offset: -progress * text_rate * tuning.text_travel,
            background_offset: progress * video_rate * tuning.background_travel,
            opacity: if crossfade {
                crossfade_opacity(progress, tuning)
            } else {
                1.0
            },
        }
    }
}

/// Fades in over the first part of the pass and out over the last
pub fn crossfade_opacity(progress: f64, tuning: &ParallaxTuning) -> f64 {
    let fade_in = smoothstep(0.0, tuning.fade_in_end, progress);
    let fade_out = 1.0 - smoothstep(tuning.fade_out_start, 1.0, progress);
    fade_in * fade_out
}

/// Media time for a progress value. Uses the real duration once the
/// media knows it, `duration_hint` until then
pub fn scrub_time(progress: f64, media_duration: f64, duration_hint: f64) -> f64 {
    let duration = if media_duration.is_finite() && media_duration > 0.0 {
        media_duration
    } else {
        duration_hint
    };
    clamp01(progress) * duration
}

/// Lets a seek through at most once per interval
#[derive(Debug, Default, Clone, Copy)]
pub struct ScrubThrottle {
    last: Option<f64>,
}

impl ScrubThrottle {
    pub fn ready(&mut self, now_ms: f64, interval_ms: f64) -> bool {
        match self.last {
            Some(last) if now_ms - last < interval_ms => false,
            _ => {
                self.last = Some(now_ms);
                true
            }
        }
    }
}

/// Index of the section whose center is closest to the viewport center.
/// Rects are `(top, height)` relative to the viewport; ties go to the first
pub fn pick_active(rects: impl IntoIterator<Item = (f64, f64)>, viewport_height: f64) -> usize {
    let middle = viewport_height / 2.0;
    rects
        .into_iter()
        .enumerate()
        .fold((0, f64::INFINITY), |(best, best_distance), (index, (top, height))| {
            let distance = (top + height / 2.0 - middle).abs();
            if distance < best_distance {
                (index, distance)
            } else {
                (best, best_distance)
            }
        })
        .0
}
