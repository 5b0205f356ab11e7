//! Vehicle steering and speed model.

use super::config::MovementConfig;

/// Speeds below this snap to zero while coasting.
const REST_SPEED: f32 = 1e-3;

/// Integrate steering into the heading. Left input (negative) turns left.
#[inline]
pub fn steer(facing: f32, steering: f32, turn_speed: f32) -> f32 {
    facing - steering.clamp(-1.0, 1.0) * turn_speed
}

/// Advance the speed scalar by one tick of throttle input.
///
/// Throttle against the current direction of travel brakes at
/// `brake_deceleration`; throttle with it (or from rest) accelerates at
/// `acceleration`. Without throttle the speed decays exponentially toward
/// zero. The result is clamped to `[-reverse_max_speed, max_speed]`.
pub fn update_speed(speed: f32, throttle: f32, config: &MovementConfig) -> f32 {
    let throttle = throttle.clamp(-1.0, 1.0);

    let next = if throttle == 0.0 {
        let decayed = speed * config.speed_decay;
        if decayed.abs() < REST_SPEED {
            0.0
        } else {
            decayed
        }
    } else {
        let braking = speed != 0.0 && speed.signum() != throttle.signum();
        let rate = if braking {
            config.brake_deceleration
        } else {
            config.acceleration
        };
        speed + throttle * rate
    };

    next.clamp(-config.reverse_max_speed, config.max_speed)
}

/// Speed after a crash: direction inverted, magnitude damped.
#[inline]
pub fn bounce(speed: f32, damping: f32) -> f32 {
    -speed * damping
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accelerates_to_max() {
        let config = MovementConfig::vehicle();
        let mut speed = 0.0;
        for _ in 0..1000 {
            speed = update_speed(speed, 1.0, &config);
        }
        assert!((speed - config.max_speed).abs() < 1e-6);
    }

    #[test]
    fn test_reverse_is_clamped() {
        let config = MovementConfig::vehicle();
        let mut speed = 0.0;
        for _ in 0..1000 {
            speed = update_speed(speed, -1.0, &config);
        }
        assert!((speed + config.reverse_max_speed).abs() < 1e-6);
    }

    #[test]
    fn test_brake_is_stronger_than_throttle() {
        let config = MovementConfig::vehicle();
        let braked = update_speed(0.3, -1.0, &config);
        assert!((braked - (0.3 - config.brake_deceleration)).abs() < 1e-6);
    }

    #[test]
    fn test_coasting_decays_to_rest() {
        let config = MovementConfig::vehicle();
        let mut speed = config.max_speed;
        for _ in 0..500 {
            let next = update_speed(speed, 0.0, &config);
            assert!(next.abs() <= speed.abs());
            speed = next;
        }
        assert_eq!(speed, 0.0);
    }

    #[test]
    fn test_bounce_inverts() {
        assert!((bounce(0.4, 0.5) + 0.2).abs() < 1e-6);
        assert!((bounce(-0.2, 0.5) - 0.1).abs() < 1e-6);
    }

    #[test]
    fn test_steer_left_increases_facing() {
        assert!(steer(0.0, -1.0, 0.05) > 0.0);
        assert!(steer(0.0, 1.0, 0.05) < 0.0);
    }
}
