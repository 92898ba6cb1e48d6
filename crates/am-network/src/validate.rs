//! Network validation logic.

use crate::error::{NetworkError, NetworkResult};
use crate::indexing::{TagIndex, TagRef};
use crate::network::{Distributor, DistributorKind, PropulsorSlot, Source};

fn check_tag(tag: &str) -> NetworkResult<()> {
    if tag.is_empty() || tag.contains('.') {
        return Err(NetworkError::InvalidTag { tag: tag.into() });
    }
    Ok(())
}

/// References, kinds and source counts.
pub(crate) fn validate_structure(
    distributors: &[Distributor],
    sources: &[Source],
    propulsors: &[PropulsorSlot],
) -> NetworkResult<()> {
    for source in sources {
        let Some(dist) = distributors.get(source.distributor.slot()) else {
            return Err(NetworkError::InvalidSourceRef {
                source: source.id,
                distributor: source.distributor,
            });
        };
        if !source.kind.feeds(dist.kind) {
            return Err(NetworkError::KindMismatch {
                tag: source.tag.clone(),
            });
        }
    }

    for prop in propulsors {
        if prop.distributor.slot() >= distributors.len() {
            return Err(NetworkError::InvalidPropulsorRef {
                propulsor: prop.id,
                distributor: prop.distributor,
            });
        }
        check_tag(&prop.group)?;
    }

    for dist in distributors {
        if !dist.auxiliary_power.is_finite() || dist.auxiliary_power < 0.0 {
            return Err(NetworkError::InvalidAuxiliaryPower {
                distributor: dist.tag.clone(),
            });
        }
        let count = sources.iter().filter(|s| s.distributor == dist.id).count();
        let ok = match dist.kind {
            DistributorKind::ElectricBus => count == 1,
            DistributorKind::FuelLine => count >= 1,
        };
        if !ok {
            return Err(NetworkError::SourceCount {
                distributor: dist.tag.clone(),
                count,
            });
        }
    }
    Ok(())
}

/// Every tag is well formed and unique across the whole network.
pub(crate) fn build_index(
    distributors: &[Distributor],
    sources: &[Source],
    propulsors: &[PropulsorSlot],
) -> NetworkResult<TagIndex> {
    let mut index = TagIndex::default();
    let entries = distributors
        .iter()
        .map(|d| (d.tag.as_str(), TagRef::Distributor(d.id)))
        .chain(sources.iter().map(|s| (s.tag.as_str(), TagRef::Source(s.id))))
        .chain(
            propulsors
                .iter()
                .map(|p| (p.tag.as_str(), TagRef::Propulsor(p.id))),
        );
    for (tag, target) in entries {
        check_tag(tag)?;
        if !index.insert(tag, target) {
            return Err(NetworkError::DuplicateTag { tag: tag.into() });
        }
    }
    Ok(index)
}
