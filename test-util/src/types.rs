/// Single-passband light curve
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LightCurve {
    pub t: Vec<f64>,
    pub m: Vec<f64>,
    pub err: Vec<f64>,
}

impl LightCurve {
    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}

/// Multi-passband light curve as flat aligned arrays, the layout accepted by the periodogram
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MultiBandLightCurve {
    pub t: Vec<f64>,
    pub m: Vec<f64>,
    pub err: Vec<f64>,
    pub band: Vec<String>,
}

impl MultiBandLightCurve {
    /// Concatenate single-passband light curves
    pub fn from_bands<S>(bands: impl IntoIterator<Item = (S, LightCurve)>) -> Self
    where
        S: Into<String>,
    {
        let mut mblc = Self::default();
        for (band, lc) in bands {
            let band = band.into();
            mblc.band.extend(std::iter::repeat_n(band, lc.len()));
            mblc.t.extend(lc.t);
            mblc.m.extend(lc.m);
            mblc.err.extend(lc.err);
        }
        mblc
    }

    pub fn len(&self) -> usize {
        self.t.len()
    }

    pub fn is_empty(&self) -> bool {
        self.t.is_empty()
    }
}
