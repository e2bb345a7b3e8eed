/// Sensor state. Expiry is checked lazily against simulation time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SensorState {
    Armed,
    Cooldown { until: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SensorVerdict {
    Scored,
    /// Ball moving up through the hoop.
    WrongDirection,
    /// A basket was scored too recently.
    CoolingDown,
}

/// Turns ball/sensor overlaps into baskets. Only downward passes count, and
/// at most one basket per cooldown window.
#[derive(Debug, Clone)]
pub struct BasketSensor {
    cooldown: f64,
    state: SensorState,
}

impl BasketSensor {
    pub fn new(cooldown_secs: f32) -> Self {
        Self {
            cooldown: cooldown_secs as f64,
            state: SensorState::Armed,
        }
    }

    pub fn state(&self, now: f64) -> SensorState {
        match self.state {
            SensorState::Cooldown { until } if now >= until => SensorState::Armed,
            s => s,
        }
    }

    /// Judge an overlap that started at `now` with the ball's vertical speed.
    pub fn on_ball_entered(&mut self, now: f64, ball_velocity_y: f32) -> SensorVerdict {
        if let SensorState::Cooldown { .. } = self.state(now) {
            return SensorVerdict::CoolingDown;
        }
        if ball_velocity_y >= 0.0 {
            return SensorVerdict::WrongDirection;
        }
        self.state = SensorState::Cooldown {
            until: now + self.cooldown,
        };
        SensorVerdict::Scored
    }

    pub fn reset(&mut self) {
        self.state = SensorState::Armed;
    }
}
