use foundation::bounds::Interval3;
use foundation::math::Affine3;

/// Identity of a source (a displayable image layer) owned by the host viewer.
///
/// Two ids are the same source iff they compare equal. The selection core
/// never holds anything but ids.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SourceId(pub u32);

impl SourceId {
    pub fn index(&self) -> u32 {
        self.0
    }
}

impl std::fmt::Display for SourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "source#{}", self.0)
    }
}

/// Per-source, per-timepoint queries answered by the host.
pub trait SourceCatalog {
    fn name(&self, id: SourceId) -> Option<String>;

    fn is_present(&self, id: SourceId, timepoint: u32) -> bool;

    /// Voxel dimensions of the source's image at `timepoint`.
    ///
    /// `None` for sources that carry no voxel data, such as overlay
    /// decorations registered with the viewer as pseudo-sources.
    fn voxel_dimensions(&self, id: SourceId, timepoint: u32) -> Option<[u64; 3]>;

    /// Local-to-world transform at `timepoint`.
    fn source_transform(&self, id: SourceId, timepoint: u32) -> Option<Affine3>;
}

/// True if the source has pixel data at `timepoint`.
///
/// Sources failing this test are overlay pseudo-sources (or absent at that
/// time) and are never projected, labelled or selected.
pub fn has_voxel_data<C: SourceCatalog + ?Sized>(
    catalog: &C,
    id: SourceId,
    timepoint: u32,
) -> bool {
    catalog.voxel_dimensions(id, timepoint).is_some()
}

/// Local box of the source at `timepoint`, or `None` if it cannot be projected.
pub fn local_interval<C: SourceCatalog + ?Sized>(
    catalog: &C,
    id: SourceId,
    timepoint: u32,
) -> Option<Interval3> {
    if !catalog.is_present(id, timepoint) {
        return None;
    }
    let dims = catalog.voxel_dimensions(id, timepoint)?;
    Some(Interval3::from_voxel_dimensions(dims))
}

#[cfg(test)]
mod tests {
    use super::{SourceCatalog, SourceId, has_voxel_data, local_interval};
    use foundation::math::{Affine3, Vec3};

    struct OneSource {
        present_until: u32,
    }

    impl SourceCatalog for OneSource {
        fn name(&self, _id: SourceId) -> Option<String> {
            Some("blobs".into())
        }

        fn is_present(&self, _id: SourceId, timepoint: u32) -> bool {
            timepoint <= self.present_until
        }

        fn voxel_dimensions(&self, id: SourceId, _timepoint: u32) -> Option<[u64; 3]> {
            (id == SourceId(0)).then_some([4, 2, 1])
        }

        fn source_transform(&self, _id: SourceId, _timepoint: u32) -> Option<Affine3> {
            Some(Affine3::identity())
        }
    }

    #[test]
    fn interval_requires_presence_and_data() {
        let catalog = OneSource { present_until: 3 };
        let i = local_interval(&catalog, SourceId(0), 2).expect("present");
        assert_eq!(i.max, Vec3::new(3.5, 1.5, 0.5));

        assert!(local_interval(&catalog, SourceId(0), 4).is_none());
        assert!(local_interval(&catalog, SourceId(1), 0).is_none());
        assert!(!has_voxel_data(&catalog, SourceId(1), 0));
    }
}
