//! Candidate retrieval queries over the record store.

use crate::{ImageKind, Record, RecordStore, StoreError};
use phash::Fingerprint;

impl RecordStore {
    /// Project a fingerprint onto this store's bucket space.
    ///
    /// Uses the same [`phash::BucketConfig`] the store applies at write time,
    /// so a caller narrowing a search to neighboring buckets looks in the
    /// space the stored records were actually bucketed into.
    pub fn bucket_of(&self, fingerprint: &Fingerprint) -> u32 {
        phash::bucket_of(fingerprint, &self.cfg.bucket)
    }

    /// Records of one image kind whose derived bucket falls within
    /// `low..=high`.
    ///
    /// Records lacking a fingerprint of the requested kind are skipped.
    /// Results come back sorted ascending by `(enrolled_at, id)`, giving
    /// downstream distance tie-breaks the same winner on every backend.
    pub fn query_by_bucket_range(
        &self,
        kind: ImageKind,
        low: u32,
        high: u32,
    ) -> Result<Vec<Record>, StoreError> {
        let mut records = Vec::new();
        self.backend.scan(&mut |data| {
            let record = self.decode_record(data)?;
            if let (Some(_), Some(bucket)) = (record.fingerprint(kind), record.bucket(kind)) {
                if (low..=high).contains(&bucket) {
                    records.push(record);
                }
            }
            Ok(())
        })?;
        sort_by_enrollment(&mut records);
        Ok(records)
    }

    /// Every stored record, sorted ascending by `(enrolled_at, id)`.
    pub fn scan_all(&self) -> Result<Vec<Record>, StoreError> {
        let mut records = Vec::new();
        self.backend.scan(&mut |data| {
            records.push(self.decode_record(data)?);
            Ok(())
        })?;
        sort_by_enrollment(&mut records);
        Ok(records)
    }
}

fn sort_by_enrollment(records: &mut [Record]) {
    records.sort_by(|a, b| (a.enrolled_at, a.id).cmp(&(b.enrolled_at, b.id)));
}
