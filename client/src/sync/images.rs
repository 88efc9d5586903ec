use model::{Envelope, Failure, ImageQuery, ImageWithUrl, MAX_IMAGE_BYTES, UploadedImage, validate_image};

use super::cache::IMAGES_KEY;
use super::{Effect, Hooks, MutationOutcome, QueryKey, error_toast};
use crate::net::{Backend, ImageUpload};

impl<B: Backend> Hooks<B> {
    /// Images attached to a court or check-in. An empty query is not sent.
    pub async fn images(&self, query: ImageQuery) -> Envelope<Vec<ImageWithUrl>> {
        if query.is_empty() {
            return Envelope::fail("Either courtId or checkinId is required").with_failure(Failure::Validation);
        }
        self.read_through(QueryKey::images(query), || self.backend.get_images(query)).await
    }

    /// Upload an image. Only the list for its association is invalidated.
    pub async fn upload_image(&self, upload: ImageUpload) -> MutationOutcome<UploadedImage> {
        if let Err(e) = upload.association.validate_upload() {
            return MutationOutcome::rejected(&e);
        }
        if let Err(e) = validate_image(&upload.content_type, upload.bytes.len(), MAX_IMAGE_BYTES) {
            return MutationOutcome::rejected(&e);
        }

        let association = upload.association;
        let envelope = self.backend.upload_image(upload).await;
        let effects = if envelope.success {
            vec![Effect::ToastSuccess("Image uploaded successfully!".to_owned())]
        } else {
            vec![error_toast(&envelope, "Failed to upload image")]
        };

        if let Some(court_id) = association.court_id {
            self.cache.invalidate(&QueryKey::images(ImageQuery::court(court_id)));
        }
        if let Some(checkin_id) = association.checkin_id {
            self.cache.invalidate(&QueryKey::images(ImageQuery::check_in(checkin_id)));
        }
        MutationOutcome { envelope, effects }
    }

    /// Delete an image by its storage id. Every image list is invalidated
    /// whatever the outcome.
    pub async fn delete_image(&self, image_id: &str) -> MutationOutcome<()> {
        let envelope = self.backend.delete_image(image_id).await;
        let effects = if envelope.success {
            vec![Effect::ToastSuccess("Image deleted successfully!".to_owned())]
        } else {
            vec![error_toast(&envelope, "Failed to delete image")]
        };

        self.cache.invalidate(&QueryKey::kind(IMAGES_KEY));
        MutationOutcome { envelope, effects }
    }
}
