// src/catalog.rs
//
// Fixed style catalogs: (identifier, display name) pairs for photo types,
// poses, backgrounds, demographics. Display names are the Indonesian product
// strings that flow into the generation prompt. Ids are stable; history
// entries reference them across sessions.
use std::collections::HashMap;

#[derive(Debug, Clone, Copy)]
pub struct StyleOption {
    pub id: &'static str,
    pub name: &'static str,
}

const fn opt(id: &'static str, name: &'static str) -> StyleOption {
    StyleOption { id, name }
}

/// Sentinel id: free-text pose/background supplied by the user.
pub const OTHER_ID: &str = "other";
/// Sentinel id: defer the pose choice to the model.
pub const RANDOM_POSE_ID: &str = "random";
/// Background id with a fixed-text substitution instead of a catalog name.
pub const STUDIO_SINGLE_COLOR_ID: &str = "studio-single-color";
/// Ethnicity id meaning "derive from the original photo"; omits the clause.
pub const ETHNICITY_AUTO_ID: &str = "auto";

pub const PHOTO_TYPES: &[StyleOption] = &[
    opt("keluarga", "Keluarga"),
    opt("anak-anak", "Anak-anak"),
    opt("personal", "Personal"),
    opt("profesional", "Profesional"),
];

pub const GENDER_OPTIONS: &[StyleOption] = &[
    opt("perempuan", "Perempuan"),
    opt("laki-laki", "Laki-laki"),
    opt("campuran", "Laki-laki & Perempuan"),
];

pub const ETHNICITY_OPTIONS: &[StyleOption] = &[
    opt("auto", "Otomatis (sesuai foto asli)"),
    opt("jawa", "Jawa"),
    opt("sunda", "Sunda"),
    opt("melayu", "Melayu"),
    opt("tionghoa", "Tionghoa"),
    opt("batak", "Batak"),
    opt("kaukasia", "Kaukasia"),
    opt("afrika", "Afrika"),
    opt("hispanik", "Hispanik"),
    opt("asia-timur", "Asia Timur"),
    opt("asia-selatan", "Asia Selatan"),
];

pub const CHILDREN_AGE_CATEGORIES: &[StyleOption] = &[
    opt("balita", "Balita (1-3 tahun)"),
    opt("prasekolah", "Prasekolah (3-5 tahun)"),
    opt("sekolah-dasar", "Usia Sekolah Dasar (6-9 tahun)"),
    opt("remaja-awal", "Pra-remaja (10-12 tahun)"),
];

pub const FAMILY_POSE_STYLES: &[StyleOption] = &[
    opt("carry-hug-cheerful", "Gendong & Peluk Ceria"),
    opt("holding-hands-walking", "Bergandengan Tangan Sambil Berjalan"),
    opt("group-sitting-grass-sofa", "Duduk Berkelompok di Rumput/Sofa"),
    opt("candid-laughing-interaction", "Interaksi Candid (Tertawa Lepas)"),
    opt("whispering-secrets", "Bisikan Rahasia"),
    opt("human-pyramid-joking", "Piramida Manusia (Bercanda)"),
    opt("future-look", "Menatap ke Satu Arah (The Future Look)"),
    opt("group-hug-from-behind", "Pelukan Grup dari Belakang"),
    opt("jumping-together-energetic", "Lompat Bersama Penuh Energi"),
    opt("reading-storybook-together", "Membaca Buku Cerita Bersama"),
    opt("lying-down-formation", "Formasi Berbaring (Kepala Berdekatan)"),
    opt("dancing-twirling", "Menari & Berputar"),
    opt("simultaneous-kisses", "Cium Pipi & Kening Serentak"),
    opt("superhero-pose", "Pose \"Kekuatan Super\""),
    opt("looking-smiling", "Saling Bertatapan & Tersenyum"),
];

pub const PERSONAL_POSE_STYLES: &[StyleOption] = &[
    opt("charming-silhouette", "Siluet Menawan"),
    opt("gazing-horizon", "Menatap Jauh ke Horizon"),
    opt("mysterious-face-cover", "Menutupi Sebagian Wajah (Misterius)"),
    opt("euphoric-jump", "Lompatan Euforia Penuh Kebebasan"),
    opt("interacting-with-nature", "Interaksi dengan Elemen Alam"),
    opt("lying-on-grass-sand", "Berbaring Santai di Rumput/Pasir"),
    opt("dancing-freely", "Menari Lepas Tanpa Aturan"),
    opt("pondering-by-window", "Duduk Merenung di Tepi Jendela"),
    opt("playing-with-shadows", "Bermain dengan Bayangan Tubuh"),
    opt("self-reflection", "Melihat Refleksi Diri (di Cermin/Air)"),
    opt("walking-away-from-camera", "Berjalan Menjauhi Kamera"),
    opt("hobby-action", "Aksi Sesuai Hobi"),
    opt("laughing-out-loud", "Ekspresi Tertawa Terbahak-bahak"),
    opt("hands-framing-face", "Tangan Membingkai Wajah"),
    opt("against-the-wind", "Melawan Arah Angin (Rambut Berkibar)"),
];

pub const PROFESSIONAL_POSE_STYLES: &[StyleOption] = &[
    opt("arms-folded-chest", "Tangan Dilipat di Depan Dada"),
    opt("sharp-stare-camera", "Menatap Lurus & Tajam ke Kamera"),
    opt("tilted-body-friendly-smile", "Badan Miring dengan Senyum Ramah"),
    opt("walking-talking-team", "Berjalan Sambil Berbicara (Tim)"),
    opt("casual-lean-wall-desk", "Bersandar Santai di Dinding/Meja"),
    opt("sitting-at-desk-working", "Duduk di Meja Seolah Bekerja"),
    opt("looking-out-window", "Menatap ke Luar Jendela"),
    opt("active-discussion-team", "Diskusi Aktif (Tim)"),
    opt("thinking-pose-hand-chin", "Pose Berpikir (Tangan di Dagu)"),
    opt("holding-professional-props", "Memegang Atribut Profesi"),
    opt("walking-towards-camera", "Berjalan Tegas Menuju Kamera"),
    opt("looking-over-shoulder", "Melihat ke Arah Bahu (Over the Shoulder)"),
    opt("hands-in-pockets", "Tangan di Saku Celana"),
    opt("candid-laugh-personality", "Tertawa Candid (Menunjukkan Kepribadian)"),
    opt("presentation-pose", "Pose Presentasi atau Berbicara"),
];

pub const CHILDREN_POSE_STYLES: &[StyleOption] = &[
    opt("playing-toys", "Bermain dengan Mainan"),
    opt("blowing-bubbles", "Meniup Gelembung Sabun"),
    opt("superhero-action", "Aksi Pahlawan Super"),
    opt("reading-storybook", "Membaca Buku Cerita"),
    opt("laughing-candidly", "Tertawa Lepas (Candid)"),
    opt("hugging-stuffed-animal", "Memeluk Boneka Kesayangan"),
    opt("silly-face", "Ekspresi Wajah Lucu"),
    opt("running-joyfully", "Berlari Penuh Suka Cita"),
    opt("dress-up-costume", "Memakai Kostum (Dokter, Putri)"),
    opt("curious-explorer", "Gaya Penjelajah Cilik"),
    opt("jumping-on-bed", "Melompat di Tempat Tidur"),
    opt("painting-drawing", "Melukis atau Menggambar"),
];

pub const FAMILY_BACKGROUNDS: &[StyleOption] = &[
    opt("sunny-park", "Taman cerah dengan pepohonan"),
    opt("cozy-living-room", "Ruang keluarga yang nyaman"),
    opt("studio-backdrop-neutral", "Latar belakang studio netral (putih/abu-abu)"),
    opt("beach-sunset", "Pantai saat matahari terbenam"),
    opt("garden-backyard", "Taman di halaman belakang rumah"),
    opt("mountain-view", "Pemandangan pegunungan"),
    opt("rustic-barn", "Lumbung pedesaan (rustic)"),
    opt("picnic-blanket", "Tikar piknik di padang rumput"),
    opt("decorated-room", "Ruangan dengan dekorasi"),
    opt("lakeside", "Tepi danau yang tenang"),
    opt("flower-field", "Ladang bunga"),
];

pub const PERSONAL_BACKGROUNDS: &[StyleOption] = &[
    opt("urban-street-art", "Jalanan kota dengan seni grafiti"),
    opt("modern-cafe", "Kafe modern dengan interior menarik"),
    opt("minimalist-studio", "Studio minimalis dengan cahaya natural"),
    opt("library-bookshelves", "Perpustakaan dengan rak buku tinggi"),
    opt("nature-trail-forest", "Jalur alam di hutan"),
    opt("rooftop-city-view", "Atap gedung dengan pemandangan kota"),
    opt("neon-lights-night", "Lampu neon di malam hari"),
    opt("cozy-home-corner", "Sudut rumah yang nyaman (misal dekat jendela)"),
    opt("industrial-loft", "Loteng bergaya industrial"),
    opt("botanical-garden", "Kebun raya"),
];

pub const PROFESSIONAL_BACKGROUNDS: &[StyleOption] = &[
    opt("solid-neutral-backdrop", "Latar belakang warna netral solid (abu-abu, putih)"),
    opt("modern-office-blurry", "Kantor modern (latar belakang blur)"),
    opt("bookshelf-wall", "Dinding rak buku yang tertata rapi"),
    opt("architectural-building", "Gedung dengan arsitektur menarik"),
    opt("conference-room", "Ruang konferensi profesional"),
    opt("textured-wall", "Dinding bertekstur (misal bata, beton)"),
    opt("studio-lighting-setup", "Studio dengan setup pencahayaan"),
    opt("minimalist-workspace", "Area kerja minimalis"),
    opt("outdoor-corporate-plaza", "Plaza luar ruangan di area perkantoran"),
    opt("dark-gradient-backdrop", "Latar belakang gradien gelap"),
];

pub const CHILDREN_BACKGROUNDS: &[StyleOption] = &[
    opt("colorful-playroom", "Ruang Bermain Penuh Warna"),
    opt("sunny-playground", "Taman Bermain Cerah"),
    opt("fantasy-world", "Dunia Fantasi (Istana, Luar Angkasa)"),
    opt("cozy-bedroom", "Kamar Tidur Nyaman dengan Bantal"),
    opt("field-of-wildflowers", "Padang Bunga Liar"),
    opt("beach-sandcastles", "Pantai sambil Membuat Istana Pasir"),
    opt("backyard-treehouse", "Halaman Belakang dengan Rumah Pohon"),
    opt("carnival-carousel", "Karnaval dengan Komidi Putar"),
    opt("children-library", "Perpustakaan Anak"),
    opt("solid-neutral-backdrop", "Latar belakang warna netral solid (abu-abu, putih)"),
    opt("simple-colorful-studio", "Latar Studio Warna-warni"),
];

/// Id → display-name maps built once at startup. Pose and background lookups
/// span the union of all per-type catalogs: a history entry may carry an id
/// from a different photo type than the one currently selected.
pub struct CatalogIndex {
    photo_types: HashMap<&'static str, &'static str>,
    poses: HashMap<&'static str, &'static str>,
    backgrounds: HashMap<&'static str, &'static str>,
    genders: HashMap<&'static str, &'static str>,
    ethnicities: HashMap<&'static str, &'static str>,
    age_categories: HashMap<&'static str, &'static str>,
}

fn index_of(catalogs: &[&[StyleOption]]) -> HashMap<&'static str, &'static str> {
    catalogs
        .iter()
        .flat_map(|c| c.iter())
        .map(|o| (o.id, o.name))
        .collect()
}

impl CatalogIndex {
    pub fn new() -> Self {
        Self {
            photo_types: index_of(&[PHOTO_TYPES]),
            poses: index_of(&[
                FAMILY_POSE_STYLES,
                PERSONAL_POSE_STYLES,
                PROFESSIONAL_POSE_STYLES,
                CHILDREN_POSE_STYLES,
            ]),
            backgrounds: index_of(&[
                FAMILY_BACKGROUNDS,
                PERSONAL_BACKGROUNDS,
                PROFESSIONAL_BACKGROUNDS,
                CHILDREN_BACKGROUNDS,
            ]),
            genders: index_of(&[GENDER_OPTIONS]),
            ethnicities: index_of(&[ETHNICITY_OPTIONS]),
            age_categories: index_of(&[CHILDREN_AGE_CATEGORIES]),
        }
    }

    pub fn photo_type_name<'a>(&self, id: &'a str) -> &'a str {
        self.photo_types.get(id).copied().unwrap_or(id)
    }

    pub fn pose_name<'a>(&self, id: &'a str) -> &'a str {
        self.poses.get(id).copied().unwrap_or(id)
    }

    pub fn background_name<'a>(&self, id: &'a str) -> &'a str {
        self.backgrounds.get(id).copied().unwrap_or(id)
    }

    pub fn gender_name<'a>(&self, id: &'a str) -> &'a str {
        self.genders.get(id).copied().unwrap_or(id)
    }

    pub fn ethnicity_name<'a>(&self, id: &'a str) -> &'a str {
        self.ethnicities.get(id).copied().unwrap_or(id)
    }

    pub fn age_category_name<'a>(&self, id: &'a str) -> &'a str {
        self.age_categories.get(id).copied().unwrap_or(id)
    }
}

impl Default for CatalogIndex {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_ids_resolve_to_display_names() {
        let index = CatalogIndex::new();
        assert_eq!(index.photo_type_name("keluarga"), "Keluarga");
        assert_eq!(index.pose_name("sunny-park"), "sunny-park"); // background id, not a pose
        assert_eq!(index.background_name("sunny-park"), "Taman cerah dengan pepohonan");
        assert_eq!(index.ethnicity_name("jawa"), "Jawa");
        assert_eq!(index.age_category_name("balita"), "Balita (1-3 tahun)");
    }

    #[test]
    fn pose_lookup_spans_all_photo_types() {
        let index = CatalogIndex::new();
        // Children pose resolves even though it belongs to another type's list.
        assert_eq!(index.pose_name("blowing-bubbles"), "Meniup Gelembung Sabun");
        assert_eq!(index.pose_name("arms-folded-chest"), "Tangan Dilipat di Depan Dada");
    }

    #[test]
    fn unknown_ids_echo_verbatim() {
        let index = CatalogIndex::new();
        assert_eq!(index.pose_name("no-such-pose"), "no-such-pose");
        assert_eq!(index.background_name(""), "");
    }
}
