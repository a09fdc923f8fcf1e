use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use crate::edge::EdgeKind;

/// Source of the physics data the absorption model is built on.
///
/// Energies are in keV and cross-sections in cm²/g, matching the units the
/// model stores its grid in.
pub trait XrayDataProvider {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Resolve an element symbol to its atomic number.
    fn atomic_number(&self, symbol: &str) -> Result<u16, Self::Error>;

    /// Edge energy in keV.
    fn edge_energy(&self, atomic_number: u16, edge: EdgeKind) -> Result<f64, Self::Error>;

    /// Total (photo + coherent + incoherent) mass attenuation of a compound
    /// at one energy, in cm²/g.
    fn total_cross_section(&self, formula: &str, energy_kev: f64) -> Result<f64, Self::Error>;

    /// Vectorised [`total_cross_section`](Self::total_cross_section).
    ///
    /// Implementations may override this when the backing data supports
    /// batch evaluation, as long as every element equals the scalar lookup.
    fn total_cross_sections(
        &self,
        formula: &str,
        energies_kev: &[f64],
    ) -> Result<Vec<f64>, Self::Error> {
        energies_kev
            .iter()
            .map(|&e| self.total_cross_section(formula, e))
            .collect()
    }
}

impl<P: XrayDataProvider + ?Sized> XrayDataProvider for &P {
    type Error = P::Error;

    fn atomic_number(&self, symbol: &str) -> Result<u16, Self::Error> {
        (**self).atomic_number(symbol)
    }

    fn edge_energy(&self, atomic_number: u16, edge: EdgeKind) -> Result<f64, Self::Error> {
        (**self).edge_energy(atomic_number, edge)
    }

    fn total_cross_section(&self, formula: &str, energy_kev: f64) -> Result<f64, Self::Error> {
        (**self).total_cross_section(formula, energy_kev)
    }

    fn total_cross_sections(
        &self,
        formula: &str,
        energies_kev: &[f64],
    ) -> Result<Vec<f64>, Self::Error> {
        (**self).total_cross_sections(formula, energies_kev)
    }
}

#[cfg(feature = "xraydb")]
mod xraydb_provider {
    use std::collections::BTreeMap;

    use xraydb::chemparser::chemparse;
    use xraydb::{CrossSectionKind, XrayDb, XrayDbError};

    use super::XrayDataProvider;
    use crate::constants::EV_PER_KEV;
    use crate::edge::EdgeKind;

    /// Elam tables from the bundled XrayDB.
    impl XrayDataProvider for XrayDb {
        type Error = XrayDbError;

        /// Accepts atomic symbols only; names and numbers are rejected.
        fn atomic_number(&self, symbol: &str) -> Result<u16, XrayDbError> {
            if self.symbol(symbol)? != symbol {
                return Err(XrayDbError::UnknownElement(symbol.to_string()));
            }
            XrayDb::atomic_number(self, symbol)
        }

        fn edge_energy(&self, atomic_number: u16, edge: EdgeKind) -> Result<f64, XrayDbError> {
            self.xray_edge(&atomic_number.to_string(), edge.label())
                .map(|e| e.energy / EV_PER_KEV)
        }

        fn total_cross_section(&self, formula: &str, energy_kev: f64) -> Result<f64, XrayDbError> {
            self.total_cross_sections(formula, &[energy_kev])?
                .pop()
                .ok_or_else(|| XrayDbError::DataError(format!("no cross-section for {formula}")))
        }

        /// Mass-fraction weighted sum of the elemental Elam cross-sections.
        ///
        /// Elements are summed in symbol order so repeated calls give
        /// bit-identical results.
        fn total_cross_sections(
            &self,
            formula: &str,
            energies_kev: &[f64],
        ) -> Result<Vec<f64>, XrayDbError> {
            let composition: BTreeMap<String, f64> = chemparse(formula)?.into_iter().collect();

            let mut weights = Vec::with_capacity(composition.len());
            for (sym, count) in &composition {
                weights.push((sym.as_str(), count * self.molar_mass(sym)?));
            }
            let total_weight: f64 = weights.iter().map(|(_, w)| w).sum();
            if total_weight <= 0.0 {
                return Err(XrayDbError::InvalidFormula(format!(
                    "zero weight formula: {formula}"
                )));
            }

            let energies_ev: Vec<f64> = energies_kev.iter().map(|e| e * EV_PER_KEV).collect();
            let mut mu = vec![0.0_f64; energies_ev.len()];
            for (sym, weight) in weights {
                let frac = weight / total_weight;
                let elem_mu = self.mu_elam(sym, &energies_ev, CrossSectionKind::Total)?;
                for (m, v) in mu.iter_mut().zip(elem_mu) {
                    *m += frac * v;
                }
            }
            Ok(mu)
        }
    }
}

/// Memoises cross-section lookups per formula and energy.
///
/// Useful when many models share compounds and edges, e.g. a batch over
/// several edges of the same sample. Results are bit-identical to the
/// wrapped provider.
pub struct CachedProvider<P> {
    inner: P,
    /// formula -> energy bits -> cross-section
    cache: Mutex<HashMap<String, HashMap<u64, f64>>>,
}

impl<P: XrayDataProvider> CachedProvider<P> {
    pub fn new(inner: P) -> Self {
        CachedProvider {
            inner,
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn inner(&self) -> &P {
        &self.inner
    }

    /// Number of memoised (formula, energy) entries.
    pub fn cached_len(&self) -> usize {
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .map(HashMap::len)
            .sum()
    }
}

impl<P: XrayDataProvider> XrayDataProvider for CachedProvider<P> {
    type Error = P::Error;

    fn atomic_number(&self, symbol: &str) -> Result<u16, Self::Error> {
        self.inner.atomic_number(symbol)
    }

    fn edge_energy(&self, atomic_number: u16, edge: EdgeKind) -> Result<f64, Self::Error> {
        self.inner.edge_energy(atomic_number, edge)
    }

    fn total_cross_section(&self, formula: &str, energy_kev: f64) -> Result<f64, Self::Error> {
        let bits = energy_kev.to_bits();
        let cached = self
            .cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(formula)
            .and_then(|per_energy| per_energy.get(&bits).copied());
        if let Some(v) = cached {
            return Ok(v);
        }
        let v = self.inner.total_cross_section(formula, energy_kev)?;
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(formula.to_string())
            .or_default()
            .insert(bits, v);
        Ok(v)
    }

    fn total_cross_sections(
        &self,
        formula: &str,
        energies_kev: &[f64],
    ) -> Result<Vec<f64>, Self::Error> {
        let missing: Vec<f64> = {
            let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            match cache.get(formula) {
                Some(per_energy) => energies_kev
                    .iter()
                    .copied()
                    .filter(|e| !per_energy.contains_key(&e.to_bits()))
                    .collect(),
                None => energies_kev.to_vec(),
            }
        };

        if !missing.is_empty() {
            let fetched = self.inner.total_cross_sections(formula, &missing)?;
            let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
            let per_energy = cache.entry(formula.to_string()).or_default();
            for (e, v) in missing.iter().zip(fetched) {
                per_energy.insert(e.to_bits(), v);
            }
        }

        let cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        let per_energy = cache.get(formula);
        energies_kev
            .iter()
            .map(|&e| match per_energy.and_then(|m| m.get(&e.to_bits())) {
                Some(&v) => Ok(v),
                None => self.inner.total_cross_section(formula, e),
            })
            .collect()
    }
}
