// src/services/prompt_builder.rs
use crate::catalog::{
    CatalogIndex, ETHNICITY_AUTO_ID, OTHER_ID, RANDOM_POSE_ID, STUDIO_SINGLE_COLOR_ID,
};
use crate::models::{GenerationConfig, PhotoType};

/// Master template handed to the model: preserve subject identity, strip
/// mannequin artifacts, keep the face unobstructed, vary angle/composition/
/// expression slightly across the six outputs, image output only.
const MASTER_TEMPLATE: &str = "Sebuah foto {{photo_type}} profesional, realistis, dan berkualitas tinggi yang menampilkan subjek dari foto yang diunggah. {{gender_instruction}}{{ethnicity_instruction}}{{age_instruction}}Gaya pose: \"{{pose_style}}\". Latar belakang: \"{{background_style}}\". {{clothing_material_instruction}}{{aspect_ratio_instruction}}Instruksi tambahan: \"{{extra_instructions}}\". PENTING: Wajah subjek harus selalu terlihat jelas dan tidak terhalang oleh apapun (seperti tangan atau rambut). Untuk setiap gambar yang dihasilkan, berikan sedikit variasi pada sudut kamera, komposisi, dan ekspresi subjek agar setiap hasil terasa unik seolah-olah diambil dari sesi foto yang sama. SANGAT PENTING: Jika subjek pada foto yang diunggah adalah MANEKIN, ubah menjadi model manusia (anak-anak) yang realistis dan fotogenik, mengenakan pakaian yang sama persis. HILANGKAN SEMUA ELEMEN MANEKIN, TERUTAMA DUDUKAN TIANG SILVER DI BAWAH KAKI, dan pastikan tidak ada bagian manekin yang terlihat sama sekali. Jika subjek pada foto asli adalah MANUSIA, pastikan semua gambar yang dihasilkan menampilkan ORANG YANG SAMA PERSIS dari foto asli. Jangan mengubah wajah atau identitas subjek sama sekali. Pertahankan subjek asli dari foto, termasuk wajah, pakaian, dan penampilan umum, namun tingkatkan kualitas foto secara keseluruhan menjadi terlihat seperti hasil jepretan fotografer profesional. Pencahayaan harus natural dan menarik, dengan depth of field yang sesuai. Hanya hasilkan gambar final, jangan tambahkan teks deskriptif apapun.";

pub const RANDOM_POSE_PHRASE: &str =
    "Pose yang kreatif dan natural yang dipilih oleh AI, yang paling sesuai dengan subjek dan suasana foto.";
pub const CUSTOM_POSE_FALLBACK: &str = "Gaya pose yang ditentukan oleh pengguna";
pub const CUSTOM_BACKGROUND_FALLBACK: &str = "Latar belakang yang ditentukan oleh pengguna";
pub const STUDIO_SINGLE_COLOR_PHRASE: &str =
    "1 warna background, tidak perlu sama dengan warna baju, bisa berbeda warna, tapi match dengan warna baju.";
pub const NO_EXTRA_INSTRUCTIONS: &str = "Tidak ada instruksi tambahan.";

/// Deterministic prompt construction from a styling configuration. Total:
/// every branch has a fallback literal, unknown catalog ids echo verbatim.
pub struct PromptBuilder {
    catalogs: CatalogIndex,
}

impl PromptBuilder {
    pub fn new(catalogs: CatalogIndex) -> Self {
        Self { catalogs }
    }

    pub fn build(&self, config: &GenerationConfig) -> String {
        let photo_type_name = self.catalogs.photo_type_name(config.photo_type.id());

        let pose_style = self.resolve_pose(config);
        let background_style = self.resolve_background(config);

        let aspect_ratio_instruction = format!(
            "Aspek rasio gambar **SUDAH** dalam rasio {}. Pastikan komposisi subjek berada di tengah bingkai rasio ini.",
            config.aspect_ratio.description()
        );

        let age_instruction = match (&config.age_category, config.photo_type) {
            (Some(age), PhotoType::AnakAnak) if !age.is_empty() => format!(
                "Subjek adalah anak-anak dalam kategori usia: {}. Pastikan suasana ceria, menyenangkan, dan menangkap kepolosan serta kegembiraan yang sesuai dengan usia tersebut. Gunakan warna-warna cerah dan bersemangat. ",
                self.catalogs.age_category_name(age)
            ),
            _ => String::new(),
        };

        let gender_instruction = match &config.gender {
            Some(gender) => format!(
                "Subjek dalam foto adalah {}. ",
                self.catalogs.gender_name(gender.id())
            ),
            None => String::new(),
        };

        let ethnicity_instruction = match config.ethnicity.as_deref() {
            Some(id) if !id.is_empty() && id != ETHNICITY_AUTO_ID => format!(
                "Subjek dalam foto adalah etnis {}. ",
                self.catalogs.ethnicity_name(id)
            ),
            _ => String::new(),
        };

        let clothing_material_instruction = match config.clothing_material.as_deref() {
            Some(material) if !material.trim().is_empty() => format!(
                "Bahan pakaian: \"{}\". Pastikan tekstur dan jatuhnya bahan terlihat realistis. ",
                material
            ),
            _ => String::new(),
        };

        let extra_instructions = if config.extra_instructions.is_empty() {
            NO_EXTRA_INSTRUCTIONS
        } else {
            config.extra_instructions.as_str()
        };

        MASTER_TEMPLATE
            .replace("{{photo_type}}", photo_type_name)
            .replace("{{gender_instruction}}", &gender_instruction)
            .replace("{{ethnicity_instruction}}", &ethnicity_instruction)
            .replace("{{age_instruction}}", &age_instruction)
            .replace("{{pose_style}}", &pose_style)
            .replace("{{background_style}}", &background_style)
            .replace("{{clothing_material_instruction}}", &clothing_material_instruction)
            .replace("{{aspect_ratio_instruction}}", &aspect_ratio_instruction)
            .replace("{{extra_instructions}}", extra_instructions)
    }

    fn resolve_pose(&self, config: &GenerationConfig) -> String {
        if config.pose_style == OTHER_ID {
            config
                .custom_pose_style
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(CUSTOM_POSE_FALLBACK)
                .to_string()
        } else if config.pose_style == RANDOM_POSE_ID {
            RANDOM_POSE_PHRASE.to_string()
        } else {
            self.catalogs.pose_name(&config.pose_style).to_string()
        }
    }

    fn resolve_background(&self, config: &GenerationConfig) -> String {
        if config.background_style == OTHER_ID {
            config
                .custom_background_style
                .as_deref()
                .filter(|s| !s.is_empty())
                .unwrap_or(CUSTOM_BACKGROUND_FALLBACK)
                .to_string()
        } else if config.background_style == STUDIO_SINGLE_COLOR_ID {
            STUDIO_SINGLE_COLOR_PHRASE.to_string()
        } else {
            self.catalogs.background_name(&config.background_style).to_string()
        }
    }
}
