use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc, Mutex, MutexGuard, PoisonError,
    },
};

use anyhow::anyhow;
use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    consts::consts::{FaceId, ImageRef, REGISTERED_FACE_SIMILARITY},
    model::{
        face::{FaceMatch, FaceMatchResult},
        person::PersonRecord,
    },
};

use super::{
    FaceRecognition, GatewayError, GatewayResult, ImageStore, Notifier, RecordStore,
};

// A panicked writer cannot leave these maps half updated, so poisoning is ignored
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Process local face collection. Images are identified by their reference only and must be
/// readable from the image store it shares with the rest of the engine
pub struct MemoryFaceRecognition {
    face_match_threshold: f32,
    images: Arc<MemoryImageStore>,
    collection: Mutex<HashMap<ImageRef, FaceMatch>>,
    faceless: Mutex<HashSet<ImageRef>>,
}

impl MemoryFaceRecognition {
    pub fn new(face_match_threshold: f32) -> Self {
        Self {
            face_match_threshold,
            images: Arc::new(MemoryImageStore::new()),
            collection: Mutex::new(HashMap::new()),
            faceless: Mutex::new(HashSet::new()),
        }
    }

    /// Seeds a readable image whose face is not indexed yet
    pub fn with_image(self, image: &str) -> Self {
        self.images.insert(image, Vec::new());
        self
    }

    /// Seeds an image that resolves to an already indexed face
    pub fn with_face(self, image: &str, face_id: &str, similarity: f32) -> Self {
        lock(&self.collection).insert(
            ImageRef(image.to_string()),
            FaceMatch::new(FaceId(face_id.to_string()), similarity),
        );
        self.with_image(image)
    }

    /// Marks an image as having no detectable face
    pub fn without_face(self, image: &str) -> Self {
        lock(&self.faceless).insert(ImageRef(image.to_string()));
        self.with_image(image)
    }

    pub fn indexed_faces(&self) -> usize {
        lock(&self.collection).len()
    }

    /// Store the recognizer reads images from
    pub fn image_store(&self) -> Arc<MemoryImageStore> {
        self.images.clone()
    }

    fn read_image(&self, image: &ImageRef) -> anyhow::Result<()> {
        if self.images.contains(image) {
            Ok(())
        } else {
            Err(anyhow!("Unable to read image from the bucket: {}", image))
        }
    }
}

#[async_trait]
impl FaceRecognition for MemoryFaceRecognition {
    async fn search_face(&self, image: &ImageRef) -> GatewayResult<FaceMatchResult> {
        self.read_image(image).map_err(GatewayError::UnableToSearchFaces)?;

        if lock(&self.faceless).contains(image) {
            return Err(GatewayError::UnableToSearchFaces(anyhow!(
                "There are no faces in the image: {}",
                image
            )));
        }

        let candidates = lock(&self.collection)
            .get(image)
            .filter(|face_match| face_match.similarity >= self.face_match_threshold)
            .cloned();

        Ok(FaceMatchResult::from_candidates(candidates))
    }

    async fn register_face(&self, image: &ImageRef) -> GatewayResult<FaceId> {
        self.read_image(image).map_err(GatewayError::UnableToIndexFace)?;

        if lock(&self.faceless).contains(image) {
            return Err(GatewayError::NoFaceIndexed(image.clone()));
        }

        let face_id = FaceId(Uuid::new_v4().to_string());

        lock(&self.collection).insert(
            image.clone(),
            FaceMatch::new(face_id.clone(), REGISTERED_FACE_SIMILARITY),
        );

        Ok(face_id)
    }
}

pub struct MemoryRecordStore {
    records: Mutex<HashMap<FaceId, PersonRecord>>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self {
            records: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_record(self, record: PersonRecord) -> Self {
        lock(&self.records).insert(record.face_id.clone(), record);
        self
    }

    pub fn len(&self) -> usize {
        lock(&self.records).len()
    }

    pub fn is_empty(&self) -> bool {
        lock(&self.records).is_empty()
    }
}

impl Default for MemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn get_record(&self, face_id: &FaceId) -> GatewayResult<Option<PersonRecord>> {
        Ok(lock(&self.records).get(face_id).cloned())
    }

    async fn put_record(&self, record: &PersonRecord) -> GatewayResult<()> {
        lock(&self.records).insert(record.face_id.clone(), record.clone());
        Ok(())
    }
}

/// Keeps every published message in an outbox instead of sending it
pub struct MemoryNotifier {
    outbox: Mutex<Vec<String>>,
    unavailable: AtomicBool,
}

impl MemoryNotifier {
    pub fn new() -> Self {
        Self {
            outbox: Mutex::new(Vec::new()),
            unavailable: AtomicBool::new(false),
        }
    }

    pub fn messages(&self) -> Vec<String> {
        lock(&self.outbox).clone()
    }

    /// While unavailable every publish fails
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }
}

impl Default for MemoryNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for MemoryNotifier {
    async fn publish(&self, message: &str) -> GatewayResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(GatewayError::UnableToPublish(anyhow!(
                "Notification topic is unavailable"
            )));
        }

        lock(&self.outbox).push(message.to_string());
        Ok(())
    }
}

pub struct MemoryImageStore {
    images: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryImageStore {
    pub fn new() -> Self {
        Self {
            images: Mutex::new(HashMap::new()),
        }
    }

    pub fn contains(&self, image: &ImageRef) -> bool {
        lock(&self.images).contains_key(image.as_str())
    }

    fn insert(&self, key: &str, bytes: Vec<u8>) {
        lock(&self.images).insert(key.to_string(), bytes);
    }
}

impl Default for MemoryImageStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageStore for MemoryImageStore {
    async fn put_image(&self, key: &str, bytes: Vec<u8>) -> GatewayResult<ImageRef> {
        self.insert(key, bytes);
        Ok(ImageRef(key.to_string()))
    }
}
