//! Hardware timers.
//!
//! Four 16-bit up-counters clocked from the CPU clock through a prescaler.
//! Timer `n + 1` can cascade from timer `n`, counting its overflows, which
//! gives a 32-bit counter from a pair.

use crate::regs;

/// Timer clock divider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Prescaler {
    /// One tick per CPU cycle (overflows every ~3.9 ms on its own).
    #[default]
    Div1,
    /// One tick per 64 cycles.
    Div64,
    /// One tick per 256 cycles.
    Div256,
    /// One tick per 1024 cycles.
    Div1024,
}

impl Prescaler {
    /// Value of the `TMxCNT_H` prescaler field.
    pub const fn bits(self) -> u16 {
        match self {
            Self::Div1 => 0,
            Self::Div64 => 1,
            Self::Div256 => 2,
            Self::Div1024 => 3,
        }
    }

    /// CPU cycles per tick.
    pub const fn divisor(self) -> u64 {
        match self {
            Self::Div1 => 1,
            Self::Div64 => 64,
            Self::Div256 => 256,
            Self::Div1024 => 1024,
        }
    }
}

/// One of the four timers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Timer {
    /// Timer 0.
    Tm0,
    /// Timer 1.
    Tm1,
    /// Timer 2.
    Tm2,
    /// Timer 3.
    Tm3,
}

impl Timer {
    /// Timer number.
    pub const fn index(self) -> usize {
        match self {
            Self::Tm0 => 0,
            Self::Tm1 => 1,
            Self::Tm2 => 2,
            Self::Tm3 => 3,
        }
    }

    /// Address of `TMxCNT_L`.
    pub const fn counter_addr(self) -> usize {
        regs::TM0CNT_L + self.index() * regs::TIMER_STRIDE + regs::TIMER_COUNT
    }

    /// Address of `TMxCNT_H`.
    pub const fn control_addr(self) -> usize {
        regs::TM0CNT_L + self.index() * regs::TIMER_STRIDE + regs::TIMER_CONTROL
    }

    /// The timer that can cascade from this one.
    pub const fn cascade_partner(self) -> Option<Self> {
        match self {
            Self::Tm0 => Some(Self::Tm1),
            Self::Tm1 => Some(Self::Tm2),
            Self::Tm2 => Some(Self::Tm3),
            Self::Tm3 => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partner_block_follows_directly() {
        let partner = Timer::Tm2.cascade_partner();
        assert_eq!(partner, Some(Timer::Tm3));
        assert_eq!(Timer::Tm3.counter_addr() - Timer::Tm2.counter_addr(), regs::TIMER_STRIDE);
        assert_eq!(Timer::Tm3.cascade_partner(), None);
    }

    #[test]
    fn prescaler_bits_fit_field() {
        for p in [Prescaler::Div1, Prescaler::Div64, Prescaler::Div256, Prescaler::Div1024] {
            assert_eq!(p.bits() & !regs::tm_cnt::PRESCALER_MASK, 0);
        }
        assert_eq!(Prescaler::Div64.bits(), 1);
        assert_eq!(Prescaler::Div64.divisor(), 64);
    }
}
