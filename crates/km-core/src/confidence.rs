//! Pointwise confidence bounds for product-limit estimates.

use km_model::CiMethod;

/// Inverse of the standard normal CDF.
///
/// Rational approximation by P. J. Acklam; relative error below 1.2e-9
/// over the open unit interval. Returns infinities at 0 and 1 and NaN
/// outside [0, 1].
pub fn normal_quantile(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e1,
        2.209_460_984_245_205e2,
        -2.759_285_104_469_687e2,
        1.383_577_518_672_690e2,
        -3.066_479_806_614_716e1,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e1,
        1.615_858_368_580_409e2,
        -1.556_989_798_598_866e2,
        6.680_131_188_771_972e1,
        -1.328_068_155_288_572e1,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-3,
        -3.223_964_580_411_365e-1,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-3,
        3.224_671_290_700_398e-1,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];
    const P_LOW: f64 = 0.024_25;

    if p.is_nan() || !(0.0..=1.0).contains(&p) {
        return f64::NAN;
    }
    if p == 0.0 {
        return f64::NEG_INFINITY;
    }
    if p == 1.0 {
        return f64::INFINITY;
    }

    let tail = |q: f64| {
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    };

    if p < P_LOW {
        tail((-2.0 * p.ln()).sqrt())
    } else if p > 1.0 - P_LOW {
        -tail((-2.0 * (1.0 - p).ln()).sqrt())
    } else {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    }
}

/// Two-sided critical value for a confidence level in (0, 1).
pub fn critical_value(confidence_level: f64) -> f64 {
    normal_quantile(0.5 + confidence_level / 2.0)
}

/// Lower and upper bound for `survival` given the Greenwood sum
/// `variance_sum` (so that `SE = S * sqrt(variance_sum)`).
pub fn confidence_bounds(survival: f64, variance_sum: f64, z: f64, method: CiMethod) -> (f64, f64) {
    if survival <= 0.0 {
        return (0.0, 0.0);
    }
    match method {
        CiMethod::Plain => {
            let half_width = z * survival * variance_sum.sqrt();
            (
                (survival - half_width).clamp(0.0, 1.0),
                (survival + half_width).clamp(0.0, 1.0),
            )
        }
        CiMethod::LogLog => {
            if survival >= 1.0 {
                return (1.0, 1.0);
            }
            let log_survival = survival.ln();
            let se_theta = variance_sum.sqrt() / log_survival.abs();
            let lower = survival.powf((z * se_theta).exp());
            let upper = survival.powf((-z * se_theta).exp());
            (lower.clamp(0.0, 1.0), upper.clamp(0.0, 1.0))
        }
    }
}
