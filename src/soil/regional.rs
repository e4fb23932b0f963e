//! Regional soil estimates used when SoilGrids has no data for a point

use rand::Rng;

/// Estimated topsoil composition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionalEstimate {
    pub clay: f64,
    pub sand: f64,
    pub silt: f64,
    pub ph: f64,
    pub organic_carbon: f64,
}

/// Base value and random spread for each property in a region
struct Profile {
    clay: (f64, f64),
    sand: (f64, f64),
    ph: (f64, f64),
    organic_carbon: (f64, f64),
}

static NORTHEAST_US: Profile = Profile {
    clay: (25.0, 15.0),
    sand: (30.0, 25.0),
    ph: (6.0, 1.5),
    organic_carbon: (2.0, 2.0),
};

static US_MIDWEST: Profile = Profile {
    clay: (20.0, 20.0),
    sand: (25.0, 30.0),
    ph: (6.5, 1.0),
    organic_carbon: (2.5, 2.0),
};

static NORTH_AMERICA: Profile = Profile {
    clay: (20.0, 25.0),
    sand: (30.0, 35.0),
    ph: (6.0, 2.0),
    organic_carbon: (1.5, 2.5),
};

static EUROPE: Profile = Profile {
    clay: (25.0, 20.0),
    sand: (25.0, 30.0),
    ph: (6.5, 1.5),
    organic_carbon: (2.0, 3.0),
};

static ASIA: Profile = Profile {
    clay: (30.0, 25.0),
    sand: (20.0, 35.0),
    ph: (5.5, 2.5),
    organic_carbon: (1.0, 2.5),
};

static GLOBAL: Profile = Profile {
    clay: (25.0, 20.0),
    sand: (30.0, 30.0),
    ph: (6.0, 2.0),
    organic_carbon: (1.5, 2.0),
};

fn profile_for(lat: f64, lon: f64) -> &'static Profile {
    if (25.0..=70.0).contains(&lat) && (-170.0..=-50.0).contains(&lon) {
        if lat >= 40.0 && (-90.0..=-70.0).contains(&lon) {
            &NORTHEAST_US
        } else if (30.0..=45.0).contains(&lat) && (-110.0..=-90.0).contains(&lon) {
            &US_MIDWEST
        } else {
            &NORTH_AMERICA
        }
    } else if (35.0..=70.0).contains(&lat) && (-10.0..=45.0).contains(&lon) {
        &EUROPE
    } else if (10.0..=55.0).contains(&lat) && (60.0..=150.0).contains(&lon) {
        &ASIA
    } else {
        &GLOBAL
    }
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Generate a plausible composition for the region containing `(lat, lon)`
///
/// Silt takes the remainder; if that leaves less than 5% it is redrawn and
/// all three fractions are rescaled to 100.
pub fn regional_estimate<R: Rng>(lat: f64, lon: f64, rng: &mut R) -> RegionalEstimate {
    let profile = profile_for(lat, lon);
    let mut draw = |(base, spread): (f64, f64)| base + rng.gen_range(0.0..1.0) * spread;

    let mut clay = draw(profile.clay);
    let mut sand = draw(profile.sand);
    let ph = draw(profile.ph);
    let organic_carbon = draw(profile.organic_carbon);

    let mut silt = 100.0 - clay - sand;
    if silt < 5.0 {
        silt = draw((5.0, 15.0));
        let total = clay + sand + silt;
        clay = clay / total * 100.0;
        sand = sand / total * 100.0;
        silt = silt / total * 100.0;
    }

    RegionalEstimate {
        clay: round1(clay),
        sand: round1(sand),
        silt: round1(silt),
        ph: round1(ph),
        organic_carbon: round1(organic_carbon),
    }
}
